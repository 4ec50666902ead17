use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use timebox_cli::commands::Cli;
use timebox_cli::config::Config;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = Config::load(cli.config_path())?;

    // Initialize logging; RUST_LOG wins over the configured level
    let level = if cli.verbose() {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    cli.execute(&config)
}
