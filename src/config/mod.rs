/// Configuration for the flowcanvas editor
///
/// Covers where workflows are stored, editor timing constants and the
/// endpoints of external collaborator services.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workflow store location
    pub storage: StorageConfig,
    /// Canvas timing and input
    pub editor: EditorConfig,
    /// External collaborators
    pub services: ServiceConfig,
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the workflow store file (default: "data")
    pub data_dir: String,
}

/// Editor timing and input constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Period of the background autosave
    pub autosave_interval_ms: u64,
    /// Wheel delta multiplier; zoom delta = -deltaY * sensitivity
    pub wheel_sensitivity: f64,
    /// Lifetime of the "node added" toast
    pub node_added_toast_ms: u64,
    /// Lifetime of the manual save confirmation
    pub saved_toast_ms: u64,
    /// Lifetime of error toasts
    pub error_toast_ms: u64,
}

/// External collaborator endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Telegram Bot API base URL (default: "https://api.telegram.org")
    pub telegram_api_base: String,
    /// Pyth Hermes endpoint (default: "https://hermes.pyth.network")
    pub hermes_url: String,
    /// Timeout for collaborator HTTP calls (default: 10)
    pub http_timeout_secs: u64,
}

impl EditorConfig {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }
}

impl ServiceConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: 3000,
            wheel_sensitivity: 0.001,
            node_added_toast_ms: 3000,
            saved_toast_ms: 2000,
            error_toast_ms: 4000,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            telegram_api_base: "https://api.telegram.org".to_string(),
            hermes_url: "https://hermes.pyth.network".to_string(),
            http_timeout_secs: 10,
        }
    }
}

impl Default for Config {
    /// Defaults with ENV_VAR overrides
    fn default() -> Self {
        let editor = EditorConfig::default();
        let services = ServiceConfig::default();
        Self {
            storage: StorageConfig {
                data_dir: std::env::var("FLOWCANVAS_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            },
            editor: EditorConfig {
                autosave_interval_ms: env_parse("FLOWCANVAS_AUTOSAVE_MS")
                    .filter(|ms: &u64| *ms > 0)
                    .unwrap_or(editor.autosave_interval_ms),
                ..editor
            },
            services: ServiceConfig {
                telegram_api_base: std::env::var("FLOWCANVAS_TELEGRAM_API")
                    .unwrap_or(services.telegram_api_base),
                hermes_url: std::env::var("FLOWCANVAS_HERMES_URL").unwrap_or(services.hermes_url),
                http_timeout_secs: env_parse("FLOWCANVAS_HTTP_TIMEOUT_SECS")
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(services.http_timeout_secs),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_autosave_period_falls_back_to_default() {
        std::env::set_var("FLOWCANVAS_AUTOSAVE_MS", "0");
        let config = Config::default();
        std::env::remove_var("FLOWCANVAS_AUTOSAVE_MS");

        assert_eq!(config.editor.autosave_interval_ms, 3000);
        assert!(!config.editor.autosave_interval().is_zero());
    }
}
