use serde::Deserialize;

/// Timeline payload produced outside the engine (a text-generation
/// collaborator, an edited preview, a hand-written file).
///
/// Field names accept the spellings used by the preview payload and by the
/// generation prompt. Numeric fields are read as floats because generated
/// JSON frequently writes `300.0` where an integer is meant.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalTimeline {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "steps")]
    pub segments: Vec<ExternalSegment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalSegment {
    #[serde(alias = "duration_s", alias = "d")]
    pub duration_seconds: f64,
    #[serde(alias = "pct_ftp", alias = "pct")]
    pub power_start: f64,
    #[serde(default, alias = "pct_ftp_end", alias = "pct_end")]
    pub power_end: Option<f64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub cadence: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Values used when the payload leaves name or focus out
#[derive(Debug, Clone)]
pub struct TimelineFallback {
    pub duration_minutes: u32,
    pub focus: String,
}

impl TimelineFallback {
    pub fn new(duration_minutes: u32, focus: impl Into<String>) -> Self {
        Self {
            duration_minutes,
            focus: focus.into(),
        }
    }

    pub fn default_name(&self) -> String {
        format!("{} {}m", self.focus, self.duration_minutes)
    }
}
