//! Time-boxed interval workout synthesis for indoor cycling.
//!
//! Builds warmup/main-set/cooldown timelines, keeps them inside physiological
//! guardrails, scores them with IF/TSS and writes them as `.zwo` and `.mrc`
//! trainer files.

pub mod errors;
pub mod export;
pub mod models;
pub mod rounding;
pub mod services;

pub use errors::{EngineError, EngineResult};
pub use export::{
    decode_structured, encode_breakpoints, encode_structured, export_file_name, render,
    ExportFormat, StructuredDocument,
};
pub use models::{Focus, Segment, SegmentKind, Workout, WorkoutMetrics, WorkoutPreview};
pub use services::{build, build_workout, compute, sanitize, BuildRequest, IntensityPolicy};
