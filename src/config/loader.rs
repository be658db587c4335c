use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.taleforge/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let taleforge_dir = home.join(".taleforge");
        let config_path = taleforge_dir.join("config.toml");

        if !taleforge_dir.exists() {
            fs::create_dir_all(&taleforge_dir).context("Failed to create .taleforge directory")?;
        }

        if config_path.exists() {
            return Self::load_from(&config_path).context("Failed to load config file");
        }

        let config = Self {
            config_path,
            ..Self::default()
        };
        config.validate()?;
        config.save()?;
        Ok(config)
    }

    /// Load and validate an explicit config file.
    pub fn load_from(path: &Path) -> std::result::Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> std::result::Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "generation.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.availability.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "availability.ttl_secs must be greater than 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::Validation(format!(
                "default_temperature must be between 0.0 and 2.0, got {}",
                self.default_temperature
            )));
        }
        if self
            .generation
            .model_unavailable_markers
            .iter()
            .any(|marker| marker.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "generation.model_unavailable_markers must not contain empty entries".into(),
            ));
        }
        Ok(())
    }
}
