use serde::{Deserialize, Serialize};

use super::{SegmentKind, Workout, WorkoutMetrics};

/// Compact JSON summary of a workout, shaped like the web preview response.
///
/// A preview can be fed back through the external timeline boundary, which
/// is how a refinement starts from a previously shown workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPreview {
    pub name: String,
    pub focus: String,
    #[serde(rename = "if")]
    pub intensity_factor: f64,
    #[serde(rename = "tss")]
    pub training_stress_score: f64,
    pub steps: Vec<PreviewStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewStep {
    #[serde(rename = "d")]
    pub duration_seconds: u32,
    pub kind: SegmentKind,
    #[serde(rename = "pct")]
    pub power_start: f64,
    #[serde(rename = "pct_end")]
    pub power_end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<u32>,
    pub note: Option<String>,
}

impl WorkoutPreview {
    pub fn new(workout: &Workout, metrics: &WorkoutMetrics) -> Self {
        let steps = workout
            .segments
            .iter()
            .map(|s| PreviewStep {
                duration_seconds: s.duration_seconds,
                kind: s.kind,
                power_start: s.power_start,
                power_end: s.power_end,
                cadence: s.cadence,
                note: s.note.clone(),
            })
            .collect();

        Self {
            name: workout.name.clone(),
            focus: workout.focus.clone(),
            intensity_factor: metrics.intensity_factor,
            training_stress_score: metrics.training_stress_score,
            steps,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    #[test]
    fn test_preview_uses_short_wire_names() {
        let workout = Workout::new(
            "VO2 45m",
            "VO2",
            vec![Segment::ramp(SegmentKind::Warmup, 324, 0.6, 0.75).with_note("Warmup")],
        );
        let metrics = WorkoutMetrics {
            intensity_factor: 0.68,
            training_stress_score: 4.2,
        };

        let value = serde_json::to_value(WorkoutPreview::new(&workout, &metrics)).unwrap();
        assert_eq!(value["if"], 0.68);
        assert_eq!(value["tss"], 4.2);
        assert_eq!(value["steps"][0]["d"], 324);
        assert_eq!(value["steps"][0]["kind"], "warmup");
        assert_eq!(value["steps"][0]["pct_end"], 0.75);
        assert_eq!(value["steps"][0]["note"], "Warmup");
    }

    #[test]
    fn test_pretty_json_reads_back() {
        let workout = Workout::new("Tempo", "Tempo", vec![Segment::steady(600, 0.8)]);
        let metrics = WorkoutMetrics {
            intensity_factor: 0.8,
            training_stress_score: 10.7,
        };
        let preview = WorkoutPreview::new(&workout, &metrics);

        let json = preview.to_json_pretty().unwrap();
        assert!(json.contains("\n  \"name\": \"Tempo\""));
        let parsed: WorkoutPreview = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, preview);
    }
}
