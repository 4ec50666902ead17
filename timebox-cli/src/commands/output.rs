use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use timebox_engine::{export_file_name, render, ExportFormat, Workout, WorkoutMetrics};
use tracing::info;

/// Target for a rendered document
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    /// `explicit` wins; otherwise `<output_dir>/<export file name>`
    pub fn resolve(
        explicit: Option<PathBuf>,
        output_dir: &Path,
        workout: &Workout,
        format: ExportFormat,
    ) -> Self {
        match explicit {
            Some(path) => Destination::File(path),
            None => Destination::File(output_dir.join(export_file_name(workout, format))),
        }
    }
}

/// Render options shared by the build and import commands
pub struct ExportRequest<'a> {
    pub format: ExportFormat,
    pub author: Option<&'a str>,
    pub description: Option<&'a str>,
}

pub fn export(workout: &Workout, request: &ExportRequest<'_>, destination: &Destination) -> Result<()> {
    let bytes = render(workout, request.format, request.author, request.description)?;

    match destination {
        Destination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
        Destination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
            fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            info!(path = %path.display(), bytes = bytes.len(), format = %request.format, "Export written");
            println!("✓ Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Segment table plus IF/TSS
pub fn print_summary(workout: &Workout, metrics: &WorkoutMetrics) {
    println!("{} ({})", workout.name, workout.focus);
    println!("────────────────────────────────────────────────");
    println!("{:>3}  {:<9} {:>8}  {:<13} Note", "#", "Kind", "Time", "Power");

    for (index, segment) in workout.segments.iter().enumerate() {
        let power = match segment.power_end {
            Some(end) => format!("{} → {}", percent(segment.power_start), percent(end)),
            None => percent(segment.power_start),
        };
        println!(
            "{:>3}  {:<9} {:>8}  {:<13} {}",
            index + 1,
            segment.kind,
            clock(u64::from(segment.duration_seconds)),
            power,
            segment.note.as_deref().unwrap_or("")
        );
    }

    println!("────────────────────────────────────────────────");
    println!(
        "Total {}   IF {:.3}   TSS {:.1}",
        clock(workout.total_duration_seconds()),
        metrics.intensity_factor,
        metrics.training_stress_score
    );
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// `h:mm:ss` above an hour, else `m:ss`
fn clock(seconds: u64) -> String {
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "0:00");
        assert_eq!(clock(324), "5:24");
        assert_eq!(clock(2700), "45:00");
        assert_eq!(clock(5400), "1:30:00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1.14), "114%");
        assert_eq!(percent(0.6), "60%");
    }

    #[test]
    fn test_default_destination_uses_export_name() {
        let workout = Workout::new("VO2 30m", "VO2", vec![]);
        match Destination::resolve(None, Path::new("out"), &workout, ExportFormat::Mrc) {
            Destination::File(path) => assert_eq!(path, Path::new("out").join("VO2_30m.mrc")),
            Destination::Stdout => panic!("expected a file destination"),
        }
    }
}
