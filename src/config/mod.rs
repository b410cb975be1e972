pub mod settings;

pub use settings::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("raws-search");

    // Create config directory if it doesn't exist
    fs::create_dir_all(&config_dir)
        .context("Failed to create config directory")?;

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from the default path, or create it with defaults.
/// Environment overrides are applied on top.
pub fn load_or_create_config() -> Result<Config> {
    let path = config_path()?;

    let mut config = if path.exists() {
        read_config(&path)?
    } else {
        let config = Config::default();
        save_config_to(&config, &path)?;
        tracing::info!(path = %path.display(), "created default config");
        config
    };

    config.apply_env_overrides();
    Ok(config)
}

/// Load configuration from an explicit file. Environment overrides are applied on top.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let mut config = read_config(path)?;
    config.apply_env_overrides();
    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Save configuration to the default path
pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &config_path()?)
}

/// Save configuration to an explicit file
pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .context("Failed to serialize config")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
