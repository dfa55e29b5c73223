//! Utility functions for the LM Chat terminal
//!
//! Settings file location and loading, plus environment overrides.

use anyhow::{Context, Result};
use shared::settings::{AppSettings, ServerSettings};
use std::path::{Path, PathBuf};

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("lm_chat");
        p.push("settings.json");
        p
    })
}

pub fn read_settings(path: &Path) -> Result<AppSettings> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let settings = serde_json::from_str::<AppSettings>(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings)
}

/// Load settings from disk or return defaults. The flag tells whether a
/// settings file was used.
pub fn load_settings_or_default() -> (AppSettings, bool) {
    if let Some(path) = config_path() {
        if path.exists() {
            match read_settings(&path) {
                Ok(settings) => return (settings, true),
                Err(e) => tracing::warn!("ignoring settings file: {:#}", e),
            }
        }
    }
    (AppSettings::default(), false)
}

/// Apply `LM_CHAT_*` overrides. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(server: &mut ServerSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("LM_CHAT_HOST").filter(|v| !v.trim().is_empty()) {
        server.host = host.trim().to_string();
    }
    if let Some(port) = lookup("LM_CHAT_PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => server.port = port,
            Err(_) => tracing::warn!("LM_CHAT_PORT is not a valid port: {:?}", port),
        }
    }
    if let Some(model) = lookup("LM_CHAT_MODEL").filter(|v| !v.trim().is_empty()) {
        server.model = Some(model.trim().to_string());
    }
    if let Some(key) = lookup("LM_CHAT_API_KEY") {
        server.api_key = Some(key);
    }
}
