use anyhow::{Context, Result};
use clap::Args;
use timebox_engine::{build, compute, WorkoutPreview};

use super::build::GeneratorArgs;
use crate::config::Config;

#[derive(Args)]
pub struct PreviewCommand {
    #[command(flatten)]
    generator: GeneratorArgs,
}

impl PreviewCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let request = self.generator.to_request(&config.generator);
        let workout = build(&request).context("Failed to build workout")?;
        let preview = WorkoutPreview::new(&workout, &compute(&workout));

        let json = serde_json::to_string_pretty(&preview).context("Failed to serialize preview")?;
        println!("{json}");

        Ok(())
    }
}
