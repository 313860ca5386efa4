//! Configuration and API key management commands

use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::keychain::{mask_api_key, KeychainPort};

/// Provider the gateway key is stored under
pub const PROVIDER: &str = "google";

/// Saves the API key to the OS keychain
pub fn save_api_key(keychain: &dyn KeychainPort, api_key: &str) -> Result<String> {
    keychain.save_api_key(PROVIDER, api_key)?;
    Ok(format!("API key saved ({})", mask_api_key(api_key.trim())))
}

/// Reports whether a key is stored, showing only its last characters
pub fn api_key_status(keychain: &dyn KeychainPort) -> String {
    match keychain.get_api_key(PROVIDER) {
        Ok(key) => format!("API key stored: {}", mask_api_key(&key)),
        Err(_) => "No API key stored. Set one with `key set` or the GEMINI_API_KEY variable."
            .to_string(),
    }
}

pub fn delete_api_key(keychain: &dyn KeychainPort) -> Result<String> {
    if !keychain.has_api_key(PROVIDER) {
        return Ok("No API key stored".to_string());
    }
    keychain.delete_api_key(PROVIDER)?;
    Ok("API key deleted".to_string())
}

/// Effective configuration as pretty JSON
pub fn show_config(config: &AppConfig) -> Result<String> {
    let body = serde_json::to_string_pretty(config)?;
    Ok(format!(
        "data dir: {}\ndatabase: {}\n{}",
        config.data_dir.display(),
        config.database_path().display(),
        body
    ))
}
