//! Configuration loading and management.
//!
//! Settings live in `config.toml` next to the task database. Today that is
//! the notification permission state and an optional analysis model
//! override.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::notify::Permission;

/// Persisted application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outcome of the last notification permission request.
    #[serde(default)]
    pub notifications: Permission,

    /// Model identifier for the AI analysis call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Config {
    /// Notifications are delivered only after a confirmed grant.
    pub fn notifications_enabled(&self) -> bool {
        self.notifications == Permission::Granted
    }

    /// Load settings from a TOML file. Missing or malformed files yield the
    /// defaults (notifications off).
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("Error parsing config, using defaults: {e}");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    /// Save settings to a TOML file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let data = toml::to_string_pretty(self).expect("config serialises");
        fs::write(path, data)
    }
}
