//! Secure API key storage using OS keychain
//!
//! This module provides secure storage for provider API keys using:
//! - Windows: Windows Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)
//! - macOS: macOS Keychain

use crate::error::{AppError, Result};
use keyring::Entry;

/// Keychain service name for Meeting Insight
const SERVICE_NAME: &str = "com.meeting-insight";

/// Trait for keychain operations - allows for mocking in tests
pub trait KeychainPort: Send + Sync {
    fn save_api_key(&self, provider: &str, api_key: &str) -> Result<()>;
    fn get_api_key(&self, provider: &str) -> Result<String>;
    fn delete_api_key(&self, provider: &str) -> Result<()>;
    fn has_api_key(&self, provider: &str) -> bool;
}

/// Keychain manager for secure API key storage using OS keychain
#[derive(Debug, Default)]
pub struct KeychainManager;

impl KeychainManager {
    /// Creates a new KeychainManager instance
    pub fn new() -> Self {
        Self
    }

    fn entry(provider: &str) -> Result<Entry> {
        Ok(Entry::new(SERVICE_NAME, &format!("llm_{}", provider))?)
    }
}

impl KeychainPort for KeychainManager {
    fn save_api_key(&self, provider: &str, api_key: &str) -> Result<()> {
        if api_key.trim().is_empty() {
            return Err(AppError::InvalidInput("API key is empty".to_string()));
        }

        Self::entry(provider)?.set_password(api_key.trim())?;
        log::info!("API key saved for {}", provider);
        Ok(())
    }

    fn get_api_key(&self, provider: &str) -> Result<String> {
        Self::entry(provider)?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => {
                AppError::NotFound(format!("No API key stored for {}", provider))
            }
            other => AppError::Keychain(other),
        })
    }

    fn delete_api_key(&self, provider: &str) -> Result<()> {
        Self::entry(provider)?.delete_password()?;
        log::info!("API key deleted for {}", provider);
        Ok(())
    }

    fn has_api_key(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_ok()
    }
}

/// Resolve the API key for a provider
///
/// Environment variables win over the keychain so CI and scripts can run
/// without an OS secret store.
pub fn resolve_api_key(keychain: &dyn KeychainPort, provider: &str) -> Result<String> {
    for var in ["GEMINI_API_KEY", "API_KEY"] {
        if let Ok(key) = std::env::var(var) {
            if !key.trim().is_empty() {
                log::debug!("Using API key from {}", var);
                return Ok(key.trim().to_string());
            }
        }
    }
    keychain.get_api_key(provider)
}

/// Mask a key for display, keeping only the last four characters
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("...{}", tail)
}

#[cfg(test)]
pub use mock::MockKeychain;
