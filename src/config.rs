//! Application configuration
//!
//! Settings live in `config.json` inside the data directory. A missing file
//! means defaults; environment variables override individual values.

use crate::controller::STORAGE_KEY;
use crate::error::{AppError, Result};
use crate::ports::llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "meeting-insight";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "meeting-insight.db";

pub const DATA_DIR_ENV: &str = "MEETING_INSIGHT_DATA_DIR";
pub const MODEL_ENV: &str = "MEETING_INSIGHT_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the config file and database
    #[serde(skip)]
    pub data_dir: PathBuf,

    pub llm: LlmConfig,

    /// Blob key the record collection is stored under
    pub storage_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            llm: LlmConfig::default(),
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve the data directory and load its configuration
    ///
    /// Order: explicit override, `MEETING_INSIGHT_DATA_DIR`, then the
    /// platform data directory.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| AppError::Config("Could not determine data directory".to_string()))?,
        };

        std::fs::create_dir_all(&data_dir)?;

        let mut config = Self::from_dir(&data_dir)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read `config.json` from `data_dir`, falling back to defaults
    pub fn from_dir(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            let config: AppConfig = serde_json::from_str(&text).map_err(|e| {
                AppError::Config(format!("Invalid {}: {}", path.display(), e))
            })?;
            log::info!("Loaded configuration from {}", path.display());
            config
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            AppConfig::default()
        };

        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            log::debug!("Model overridden to {}", model);
            self.llm.model = model.trim().to_string();
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
