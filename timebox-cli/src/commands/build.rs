use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use timebox_engine::{build, compute, BuildRequest, ExportFormat, IntensityPolicy};

use super::output::{export, print_summary, Destination, ExportRequest};
use crate::config::{Config, GeneratorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Every work/recovery pair draws its own targets
    PerRepetition,
    /// One draw is reused for the whole session
    PerSession,
}

impl From<PolicyArg> for IntensityPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::PerRepetition => IntensityPolicy::PerRepetition,
            PolicyArg::PerSession => IntensityPolicy::PerSession,
        }
    }
}

/// Generator flags shared by `build` and `preview`; unset flags fall back to config
#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    /// Session length in minutes (20 to 1440)
    #[arg(short, long)]
    duration: Option<u32>,

    /// Training focus: Recovery, Endurance, SweetSpot, Threshold or VO2
    #[arg(short, long)]
    focus: Option<String>,

    /// Randomize durations and intensities within their ranges
    #[arg(long)]
    vary: bool,

    /// Seed for a reproducible varied workout
    #[arg(long)]
    seed: Option<u64>,

    /// How repeated intervals draw their targets
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
}

impl GeneratorArgs {
    pub fn to_request(&self, defaults: &GeneratorConfig) -> BuildRequest {
        BuildRequest::new(
            self.duration.unwrap_or(defaults.duration_minutes),
            self.focus.clone().unwrap_or_else(|| defaults.focus.clone()),
        )
        .with_vary(self.vary || defaults.vary)
        .with_seed(self.seed)
        .with_policy(self.policy.map(Into::into).unwrap_or(defaults.intensity_policy))
    }
}

#[derive(Args)]
pub struct BuildCommand {
    #[command(flatten)]
    generator: GeneratorArgs,

    /// Output format: zwo, mrc or json
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Output file (defaults to <output_dir>/<workout name>.<ext>)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Author written into .zwo documents
    #[arg(long)]
    author: Option<String>,

    /// Description written into .zwo documents
    #[arg(long)]
    description: Option<String>,

    /// Print the document instead of writing a file
    #[arg(long)]
    stdout: bool,
}

impl BuildCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let request = self.generator.to_request(&config.generator);
        let workout = build(&request).context("Failed to build workout")?;
        let metrics = compute(&workout);

        let format = self.format.unwrap_or(config.export.format);
        let author = self.author.as_deref().or(config.export.author.as_deref());
        let export_request = ExportRequest {
            format,
            author,
            description: self.description.as_deref(),
        };

        if self.stdout {
            return export(&workout, &export_request, &Destination::Stdout);
        }

        print_summary(&workout, &metrics);
        println!();

        let destination =
            Destination::resolve(self.output, &config.export.output_dir, &workout, format);
        export(&workout, &export_request, &destination)
    }
}
