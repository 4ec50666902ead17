// Timeline services: guardrails, synthesis, load metrics, external timelines

pub mod external_timeline_service;
pub mod guardrail_service;
pub mod interval_synthesis_service;
pub mod load_metrics_service;

pub use external_timeline_service::{
    decode_external_timeline, ExternalTimelineService, GenerationPrompt, TimelineCollaborator,
};
pub use guardrail_service::{clamp_power, sanitize};
pub use interval_synthesis_service::{
    build, build_with_rng, build_workout, BuildRequest, IntensityPolicy, MAX_DURATION_MINUTES,
    MIN_DURATION_MINUTES,
};
pub use load_metrics_service::compute;
