use serde_json;
use std::fs;
use std::path::Path;

use super::storage::get_data_dir;
use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const CONFIG_FILE: &str = "config.json";

/// Load application config
pub fn load_app_config() -> AppResult<AppConfig> {
    load_app_config_from(&get_data_dir()?)
}

/// Save application config
pub fn save_app_config(config: &AppConfig) -> AppResult<()> {
    save_app_config_to(&get_data_dir()?, config)
}

pub fn load_app_config_from(data_dir: &Path) -> AppResult<AppConfig> {
    let config_path = data_dir.join(CONFIG_FILE);

    if !config_path.exists() {
        return Ok(AppConfig::new());
    }

    let content = fs::read_to_string(&config_path)
        .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;
    validate(&config)?;
    Ok(config)
}

pub fn save_app_config_to(data_dir: &Path, config: &AppConfig) -> AppResult<()> {
    validate(config)?;
    let config_path = data_dir.join(CONFIG_FILE);

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, content)
        .map_err(|e| AppError::Config(format!("Failed to save config: {}", e)))
}

fn validate(config: &AppConfig) -> AppResult<()> {
    let url = url::Url::parse(&config.generation_url).map_err(|e| {
        AppError::Config(format!(
            "Invalid generation_url {}: {}",
            config.generation_url, e
        ))
    })?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(AppError::Config(format!(
            "Unsupported generation_url scheme: {}",
            url.scheme()
        )));
    }
    Ok(())
}
