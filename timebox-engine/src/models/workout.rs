use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest segment any exported timeline may contain.
pub const MIN_SEGMENT_SECONDS: u32 = 5;

/// Lower bound for every power target, as a fraction of FTP.
pub const MIN_POWER_FRACTION: f64 = 0.50;

/// Upper bound for every power target (300% FTP covers sprint efforts).
pub const MAX_POWER_FRACTION: f64 = 3.00;

/// How a segment is rendered by the encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Steady,
    Ramp,
    Warmup,
    Cooldown,
}

impl SegmentKind {
    /// Only warmup and cooldown segments keep a distinct end power after sanitizing.
    pub fn may_ramp(self) -> bool {
        matches!(self, SegmentKind::Warmup | SegmentKind::Cooldown)
    }

    /// Kinds the structured encoder can emit as a ramp element.
    pub fn is_ramp_capable(self) -> bool {
        !matches!(self, SegmentKind::Steady)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Steady => "steady",
            SegmentKind::Ramp => "ramp",
            SegmentKind::Warmup => "warmup",
            SegmentKind::Cooldown => "cooldown",
        }
    }

    /// Case-insensitive lookup used for untrusted payloads.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "steady" => Some(SegmentKind::Steady),
            "ramp" => Some(SegmentKind::Ramp),
            "warmup" => Some(SegmentKind::Warmup),
            "cooldown" => Some(SegmentKind::Cooldown),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One atomic time/power unit of a workout timeline.
///
/// `power_end` is `None` for a steady segment. When present the target moves
/// linearly from `power_start` to `power_end` over `duration_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub duration_seconds: u32,
    pub power_start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_end: Option<f64>,
    pub kind: SegmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Segment {
    /// Constant power segment
    pub fn steady(duration_seconds: u32, power: f64) -> Self {
        Self {
            duration_seconds,
            power_start: power,
            power_end: None,
            kind: SegmentKind::Steady,
            cadence: None,
            note: None,
        }
    }

    /// Linearly changing segment of the given kind
    pub fn ramp(kind: SegmentKind, duration_seconds: u32, start: f64, end: f64) -> Self {
        Self {
            duration_seconds,
            power_start: start,
            power_end: Some(end),
            kind,
            cadence: None,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_cadence(mut self, rpm: u32) -> Self {
        self.cadence = Some(rpm);
        self
    }

    /// Target at the end of the segment; steady segments end where they start.
    pub fn end_power(&self) -> f64 {
        self.power_end.unwrap_or(self.power_start)
    }

    /// True when the target actually changes over the segment.
    pub fn is_ramping(&self) -> bool {
        matches!(self.power_end, Some(end) if end != self.power_start)
    }

    /// The kind the structured encoder emits for this segment.
    pub fn rendered_kind(&self) -> SegmentKind {
        if self.kind.is_ramp_capable() && self.is_ramping() {
            self.kind
        } else {
            SegmentKind::Steady
        }
    }
}

/// Main-set template selected from the free-form focus label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    Recovery,
    Endurance,
    SweetSpot,
    Threshold,
    #[serde(rename = "VO2")]
    Vo2,
}

impl Focus {
    pub const ALL: [Focus; 5] = [
        Focus::Recovery,
        Focus::Endurance,
        Focus::SweetSpot,
        Focus::Threshold,
        Focus::Vo2,
    ];

    /// Case-insensitive match; unrecognized labels fall back to the VO2 template.
    pub fn from_label(label: &str) -> Self {
        Self::recognize(label).unwrap_or(Focus::Vo2)
    }

    /// Exact recognition without the VO2 fallback.
    pub fn recognize(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|focus| focus.label().to_lowercase() == wanted)
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::Recovery => "Recovery",
            Focus::Endurance => "Endurance",
            Focus::SweetSpot => "SweetSpot",
            Focus::Threshold => "Threshold",
            Focus::Vo2 => "VO2",
        }
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A complete workout timeline. Segment order is temporal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub name: String,
    /// Focus label exactly as requested
    pub focus: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub segments: Vec<Segment>,
}

impl Workout {
    pub fn new(name: impl Into<String>, focus: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            name: name.into(),
            focus: focus.into(),
            description: None,
            segments,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sum of all segment durations
    pub fn total_duration_seconds(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| u64::from(s.duration_seconds))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_labels_are_case_insensitive() {
        assert_eq!(Focus::from_label("sweetspot"), Focus::SweetSpot);
        assert_eq!(Focus::from_label("  THRESHOLD "), Focus::Threshold);
        assert_eq!(Focus::from_label("vo2"), Focus::Vo2);
        assert_eq!(Focus::from_label("Recovery"), Focus::Recovery);
    }

    #[test]
    fn test_unknown_focus_uses_vo2_template() {
        assert_eq!(Focus::from_label("anaerobic"), Focus::Vo2);
        assert_eq!(Focus::recognize("anaerobic"), None);
    }

    #[test]
    fn test_rendered_kind() {
        let warmup = Segment::ramp(SegmentKind::Warmup, 300, 0.6, 0.75);
        assert_eq!(warmup.rendered_kind(), SegmentKind::Warmup);

        let flat_warmup = Segment::ramp(SegmentKind::Warmup, 300, 0.6, 0.6);
        assert_eq!(flat_warmup.rendered_kind(), SegmentKind::Steady);

        let steady = Segment::steady(60, 1.0);
        assert!(!steady.is_ramping());
        assert_eq!(steady.end_power(), 1.0);
    }

    #[test]
    fn test_total_duration() {
        let workout = Workout::new(
            "Test",
            "VO2",
            vec![Segment::steady(60, 1.0), Segment::steady(45, 0.5)],
        );
        assert_eq!(workout.total_duration_seconds(), 105);
    }

    #[test]
    fn test_segment_serialization_omits_absent_fields() {
        let json = serde_json::to_string(&Segment::steady(60, 0.9)).unwrap();
        assert_eq!(
            json,
            r#"{"duration_seconds":60,"power_start":0.9,"kind":"steady"}"#
        );
    }
}
