// Trainer file encoders, the structured document reader and file naming

pub mod breakpoints;
pub mod reader;
pub mod structured;

pub use breakpoints::encode_breakpoints;
pub use reader::{decode_structured, StructuredDocument};
pub use structured::encode_structured;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{EngineError, EngineResult};
use crate::models::{Workout, WorkoutPreview};
use crate::services::load_metrics_service::compute;

/// Output document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Structured XML workout (`.zwo`)
    #[default]
    Zwo,
    /// Line breakpoint course (`.mrc`)
    Mrc,
    /// Preview JSON
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Zwo, ExportFormat::Mrc, ExportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Zwo => "zwo",
            ExportFormat::Mrc => "mrc",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| format!("unknown export format '{s}' (expected zwo, mrc or json)"))
    }
}

/// File name for an exported workout: spaces become `_`, plus the extension.
pub fn export_file_name(workout: &Workout, format: ExportFormat) -> String {
    format!("{}.{}", workout.name.replace(' ', "_"), format.extension())
}

/// Render a workout in the requested format.
///
/// `author` and `description` only affect the structured document.
pub fn render(
    workout: &Workout,
    format: ExportFormat,
    author: Option<&str>,
    description: Option<&str>,
) -> EngineResult<Vec<u8>> {
    match format {
        ExportFormat::Zwo => encode_structured(workout, author, description),
        ExportFormat::Mrc => Ok(encode_breakpoints(workout).into_bytes()),
        ExportFormat::Json => {
            let mut json = WorkoutPreview::new(workout, &compute(workout))
                .to_json_pretty()
                .map_err(EngineError::encoding)?;
            json.push('\n');
            Ok(json.into_bytes())
        }
    }
}
