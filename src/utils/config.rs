use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const ENV_API_KEY: &str = "ARTIFIX_API_KEY";
const ENV_DATA_DIR: &str = "ARTIFIX_DATA_DIR";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var(ENV_API_KEY)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    pub ai: AiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            ai: AiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://integrate.api.nvidia.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "moonshotai/kimi-k2-instruct-0905".to_string(),
        }
    }
}

pub fn apply_env_defaults(settings: &mut Settings) {
    if settings.ai.api_key.trim().is_empty() {
        settings.ai.api_key = api_key_from_env().unwrap_or_default();
    }
}

/// Data directory holding the settings file, the mode registry JSON
/// and both SQLite databases. Overridable via ARTIFIX_DATA_DIR.
pub fn data_dir() -> PathBuf {
    std::env::var(ENV_DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

pub fn read_settings(data_dir: &Path) -> Settings {
    let config_path = data_dir.join("config").join("settings.json");
    let mut settings = if config_path.exists() {
        std::fs::read_to_string(&config_path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    } else {
        Settings::default()
    };
    apply_env_defaults(&mut settings);
    settings
}

pub fn write_settings(data_dir: &Path, settings: &Settings) -> std::io::Result<()> {
    let config_dir = data_dir.join("config");
    std::fs::create_dir_all(&config_dir)?;
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(config_dir.join("settings.json"), content)
}
