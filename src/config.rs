use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    pub claude_api_key: Option<String>,
    pub tts_api_key: Option<String>,

    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("readcast")
}

fn default_db_path() -> String {
    let dir = data_dir();
    std::fs::create_dir_all(&dir).ok();
    dir.join("readcast.db").to_string_lossy().to_string()
}

fn default_audio_dir() -> PathBuf {
    data_dir().join("episodes")
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            audio_dir: default_audio_dir(),
            claude_api_key: None,
            tts_api_key: None,
            tts_voice: default_tts_voice(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readcast")
            .join("config.toml")
    }
}
