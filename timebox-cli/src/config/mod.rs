use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use timebox_engine::{ExportFormat, IntensityPolicy};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,

    #[serde(default = "default_focus")]
    pub focus: String,

    #[serde(default)]
    pub vary: bool,

    #[serde(default)]
    pub intensity_policy: IntensityPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

// Default value functions
fn default_duration_minutes() -> u32 {
    45
}

fn default_focus() -> String {
    "VO2".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration_minutes(),
            focus: default_focus(),
            vary: false,
            intensity_policy: IntensityPolicy::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            author: None,
            output_dir: default_output_dir(),
            format: ExportFormat::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.timebox/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".timebox"))
    }

    /// Get config file path (~/.timebox/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// The explicit path when given, else the default location
    pub fn resolve_path(override_path: Option<&Path>) -> Result<PathBuf> {
        match override_path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_file(),
        }
    }

    /// Load configuration; a missing file means defaults
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let config_file = Self::resolve_path(override_path)?;
        Self::load_from(&config_file)
    }

    pub fn load_from(config_file: &Path) -> Result<Self> {
        if !config_file.exists() {
            tracing::debug!(path = %config_file.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read config file {}", config_file.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_file.display()))?;

        Ok(config)
    }

    /// Save configuration to file, creating parent directories
    pub fn save_to(&self, config_file: &Path) -> Result<()> {
        if let Some(parent) = config_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = self.to_toml()?;
        fs::write(config_file, contents).context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generator.duration_minutes, 45);
        assert_eq!(config.generator.focus, "VO2");
        assert!(!config.generator.vary);
        assert_eq!(config.generator.intensity_policy, IntensityPolicy::PerRepetition);
        assert_eq!(config.export.format, ExportFormat::Zwo);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
        assert!(serialized.contains("intensity_policy = \"per_repetition\""));
        assert!(serialized.contains("format = \"zwo\""));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [generator]
            focus = "Threshold"
            intensity_policy = "per_session"

            [export]
            author = "Coach"
            format = "mrc"
            "#,
        )
        .unwrap();

        assert_eq!(config.generator.focus, "Threshold");
        assert_eq!(config.generator.duration_minutes, 45);
        assert_eq!(config.generator.intensity_policy, IntensityPolicy::PerSession);
        assert_eq!(config.export.author.as_deref(), Some("Coach"));
        assert_eq!(config.export.format, ExportFormat::Mrc);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.generator.duration_minutes = 90;
        config.export.author = Some("Me".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[generator]\nduration_minutes = \"long\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
