use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use timebox_engine::models::TimelineFallback;
use timebox_engine::services::decode_external_timeline;
use timebox_engine::{compute, decode_structured, sanitize, ExportFormat, Workout};

use super::output::{export, print_summary, Destination, ExportRequest};
use crate::config::Config;

#[derive(Args)]
pub struct ImportCommand {
    /// JSON timeline (preview or generator reply) or .zwo document
    path: PathBuf,

    /// Focus label to use when the input carries none
    #[arg(short, long)]
    focus: Option<String>,

    /// Re-export in this format: zwo, mrc or json
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Re-export to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Author written into .zwo documents
    #[arg(long)]
    author: Option<String>,
}

impl ImportCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let focus = self
            .focus
            .clone()
            .unwrap_or_else(|| config.generator.focus.clone());

        let workout = if is_structured(&self.path, &bytes) {
            let document = decode_structured(&bytes)
                .with_context(|| format!("Failed to parse {}", self.path.display()))?;
            sanitize(document.into_workout(focus))
        } else {
            let text = String::from_utf8_lossy(&bytes);
            let fallback = TimelineFallback::new(config.generator.duration_minutes, focus);
            decode_external_timeline(&text, &fallback)
                .with_context(|| format!("Failed to parse {}", self.path.display()))?
        };

        print_summary(&workout, &compute(&workout));

        if self.format.is_none() && self.output.is_none() {
            return Ok(());
        }
        println!();
        self.re_export(&workout, config)
    }

    fn re_export(self, workout: &Workout, config: &Config) -> Result<()> {
        let format = self
            .format
            .or_else(|| self.output.as_deref().and_then(format_from_extension))
            .unwrap_or(config.export.format);
        let request = ExportRequest {
            format,
            author: self.author.as_deref().or(config.export.author.as_deref()),
            description: None,
        };
        let destination =
            Destination::resolve(self.output, &config.export.output_dir, workout, format);
        export(workout, &request, &destination)
    }
}

/// `.zwo` files, or anything that starts like an XML document
fn is_structured(path: &Path, bytes: &[u8]) -> bool {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zwo") || ext.eq_ignore_ascii_case("xml"));
    by_extension || bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<')
}

fn format_from_extension(path: &Path) -> Option<ExportFormat> {
    path.extension()?.to_str()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_detection() {
        assert!(is_structured(Path::new("ride.ZWO"), b"{}"));
        assert!(is_structured(Path::new("ride.txt"), b"  <?xml version=\"1.0\"?>"));
        assert!(!is_structured(Path::new("reply.json"), b"```json\n{}"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(format_from_extension(Path::new("a/b.mrc")), Some(ExportFormat::Mrc));
        assert_eq!(format_from_extension(Path::new("a/b.fit")), None);
        assert_eq!(format_from_extension(Path::new("a/b")), None);
    }
}
