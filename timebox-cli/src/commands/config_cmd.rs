use anyhow::Result;
use std::path::Path;

use crate::config::Config;

pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("────────────────────────────────");
    println!();
    println!("{}", config.to_toml()?);

    Ok(())
}

pub fn init_config(override_path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = Config::resolve_path(override_path)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(&config_file)?;

    println!("✓ Configuration initialized at: {}", config_file.display());

    Ok(())
}
