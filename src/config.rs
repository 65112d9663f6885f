//! Shared config utilities for loading/saving JSON config files
//! and resolving API keys from fields or environment variables.

use crate::llm::llm_config::LlmConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                tracing::info!(label, path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(
                    label,
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                T::default()
            }
        },
        Err(_) => {
            tracing::info!(label, path = %path.display(), "no config file, using defaults");
            T::default()
        }
    }
}

/// Generic save for any Serde config type.
pub fn save_json_config<T: Serialize>(
    path: &Path,
    config: &T,
    label: &str,
) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    tracing::info!(label, path = %path.display(), "saved config");
    Ok(())
}

/// Resolve an API key: check the direct `api_key` field first,
/// then fall back to reading the environment variable named in `api_key_env`.
pub fn resolve_api_key(api_key: &Option<String>, api_key_env: &Option<String>) -> Option<String> {
    if let Some(ref key) = api_key {
        if !key.is_empty() {
            return Some(key.clone());
        }
    }
    if let Some(ref env_var) = api_key_env {
        if let Ok(key) = std::env::var(env_var) {
            if !key.is_empty() {
                return Some(key);
            }
        }
    }
    None
}

/// `<platform config dir>/ralsei-chat/config.json`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ralsei-chat")
        .join("config.json")
}

// ── Session timeline ───────────────────────────────────────

/// Durations of the scripted transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Pink flash between pressing start and the first greeting.
    #[serde(default = "default_intro_ms")]
    pub intro_ms: u64,
    /// Fade-out of the death overlay after the video ends.
    #[serde(default = "default_cutscene_fade_ms")]
    pub cutscene_fade_ms: u64,
}

fn default_intro_ms() -> u64 {
    2000
}

fn default_cutscene_fade_ms() -> u64 {
    2000
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            intro_ms: default_intro_ms(),
            cutscene_fade_ms: default_cutscene_fade_ms(),
        }
    }
}

impl TimelineConfig {
    pub fn intro(&self) -> Duration {
        Duration::from_millis(self.intro_ms)
    }

    pub fn cutscene_fade(&self) -> Duration {
        Duration::from_millis(self.cutscene_fade_ms)
    }
}

// ── Top-level config ───────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

impl ChatConfig {
    pub fn load(path: &Path) -> Self {
        load_json_config(path, "Chat")
    }

    pub fn load_default() -> Self {
        Self::load(&default_config_path())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_json_config(path, self, "Chat")
    }
}
