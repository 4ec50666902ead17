use tracing::{debug, warn};

use crate::errors::{EngineError, EngineResult};
use crate::models::{
    ExternalSegment, ExternalTimeline, Segment, SegmentKind, TimelineFallback, Workout,
    WorkoutPreview,
};
use crate::services::guardrail_service::sanitize;
use crate::services::load_metrics_service::compute;

const SYSTEM_INSTRUCTIONS: &str = r#"You write indoor cycling workouts as JSON:
{
  "name": "string",
  "focus": "Endurance|SweetSpot|Threshold|VO2",
  "steps": [
    {"duration_s": int, "pct_ftp": float, "kind": "steady|ramp|warmup|cooldown", "pct_ftp_end": float?, "note": str?}
  ]
}
Rules:
- At least 5 seconds per step
- Intensities usually 0.50-1.20 of FTP (sprints above 1.2 are fine), warmup and cooldown as ramps
- Total time within 60 seconds of the requested duration
Reply with JSON only, no explanations."#;

/// Messages handed to a text-generation collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

impl GenerationPrompt {
    pub fn for_generation(duration_minutes: u32, focus: &str, preferences: &str) -> Self {
        let preferences = if preferences.trim().is_empty() {
            "none"
        } else {
            preferences.trim()
        };
        Self {
            system: SYSTEM_INSTRUCTIONS.to_string(),
            user: format!(
                "Parameters:\n- Duration: {duration_minutes} min\n- Focus: {focus}\n- Preferences: {preferences}"
            ),
        }
    }

    pub fn for_refinement(previous_preview_json: &str, change_request: &str) -> Self {
        Self {
            system: SYSTEM_INSTRUCTIONS.to_string(),
            user: format!(
                "Current workout:\n{previous_preview_json}\n\nChange request: {}\n\nReturn the complete revised workout.",
                change_request.trim()
            ),
        }
    }
}

/// Natural-language workout generator living outside the engine.
///
/// Implementations return the raw reply text; any transport failure is
/// reported as a message and surfaced as [`EngineError::Collaborator`].
#[cfg_attr(test, mockall::automock)]
pub trait TimelineCollaborator {
    fn complete(&self, prompt: &GenerationPrompt) -> Result<String, String>;
}

/// Decode a timeline produced outside the engine and sanitize it.
///
/// The reply may wrap the JSON object in prose or a Markdown code fence;
/// everything from the first `{` to the last `}` is parsed.
pub fn decode_external_timeline(raw: &str, fallback: &TimelineFallback) -> EngineResult<Workout> {
    let object = extract_json_object(raw)?;
    let timeline: ExternalTimeline = serde_json::from_str(object)?;

    let segments: Vec<Segment> = timeline
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| convert_segment(index, segment))
        .collect();

    let name = timeline.name.unwrap_or_else(|| fallback.default_name());
    let focus = timeline.focus.unwrap_or_else(|| fallback.focus.clone());
    let mut workout = Workout::new(name, focus, segments);
    workout.description = timeline.description;

    debug!(
        name = %workout.name,
        segments = workout.segments.len(),
        "Decoded external timeline"
    );

    Ok(sanitize(workout))
}

fn extract_json_object(raw: &str) -> EngineResult<&str> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(first), Some(last)) if last > first => Ok(&raw[first..=last]),
        _ => Err(EngineError::malformed_timeline("no JSON object found")),
    }
}

fn convert_segment(index: usize, segment: &ExternalSegment) -> Segment {
    let kind = match segment.kind.as_deref() {
        None => SegmentKind::Steady,
        Some(label) => SegmentKind::from_label(label).unwrap_or_else(|| {
            warn!(index, kind = label, "Unknown segment kind; treating as steady");
            SegmentKind::Steady
        }),
    };

    let duration_seconds = if segment.duration_seconds < 0.0 {
        warn!(index, duration = segment.duration_seconds, "Negative segment duration");
        0
    } else {
        segment.duration_seconds.min(f64::from(u32::MAX)) as u32
    };

    Segment {
        duration_seconds,
        power_start: segment.power_start,
        power_end: segment.power_end,
        kind,
        cadence: segment
            .cadence
            .filter(|rpm| *rpm > 0.0)
            .map(|rpm| rpm.round().min(f64::from(u32::MAX)) as u32),
        note: segment.note.clone(),
    }
}

/// Generation and refinement through a [`TimelineCollaborator`].
///
/// Replies always pass through [`decode_external_timeline`]; nothing is
/// retried here.
pub struct ExternalTimelineService<C: TimelineCollaborator> {
    collaborator: C,
}

impl<C: TimelineCollaborator> ExternalTimelineService<C> {
    pub fn new(collaborator: C) -> Self {
        Self { collaborator }
    }

    pub fn generate(
        &self,
        duration_minutes: u32,
        focus: &str,
        preferences: &str,
    ) -> EngineResult<Workout> {
        let prompt = GenerationPrompt::for_generation(duration_minutes, focus, preferences);
        let fallback = TimelineFallback::new(duration_minutes, focus);
        self.complete_and_decode(&prompt, &fallback)
    }

    /// Ask for a revised version of `previous`, described by its preview JSON.
    pub fn refine(&self, previous: &Workout, change_request: &str) -> EngineResult<Workout> {
        let preview = WorkoutPreview::new(previous, &compute(previous));
        let preview_json = preview.to_json_pretty().map_err(EngineError::encoding)?;
        let prompt = GenerationPrompt::for_refinement(&preview_json, change_request);

        let minutes = (previous.total_duration_seconds() + 30) / 60;
        let fallback = TimelineFallback::new(
            u32::try_from(minutes).unwrap_or(u32::MAX),
            previous.focus.clone(),
        );
        self.complete_and_decode(&prompt, &fallback)
    }

    fn complete_and_decode(
        &self,
        prompt: &GenerationPrompt,
        fallback: &TimelineFallback,
    ) -> EngineResult<Workout> {
        let reply = self
            .collaborator
            .complete(prompt)
            .map_err(EngineError::Collaborator)?;
        decode_external_timeline(&reply, fallback)
    }
}
