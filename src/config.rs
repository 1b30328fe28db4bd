use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub gemini: GeminiSettings,
}

/// Connection settings for the Gemini `generateContent` endpoint.
///
/// The key is optional here: a missing key is reported per request instead of
/// preventing the server from starting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            model: default_model(),
        }
    }
}

impl GeminiSettings {
    /// Returns the configured key, treating a blank value as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default = "default_port")]
    port: u16,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// `GEMINI_*` variables layered over a config file.
#[derive(Debug, Default, Deserialize)]
struct GeminiOverlay {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_base: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

fn from_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&contents)?;
    let overlay = envy::prefixed("GEMINI_")
        .from_env::<GeminiOverlay>()
        .map_err(|e| format!("Failed to parse GEMINI_* variables: {e}"))?;
    Ok(with_env_overlay(config, overlay))
}

// Non-blank environment values take precedence over the file
fn with_env_overlay(mut config: Config, overlay: GeminiOverlay) -> Config {
    let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    if let Some(api_key) = non_blank(overlay.api_key) {
        config.gemini.api_key = Some(api_key);
    }
    if let Some(api_base) = non_blank(overlay.api_base) {
        config.gemini.api_base = api_base;
    }
    if let Some(model) = non_blank(overlay.model) {
        config.gemini.model = model;
    }
    config
}

fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let server = envy::from_env::<EnvConfig>()
        .map_err(|e| format!("Failed to parse PORT: {e}"))?;
    let gemini = envy::prefixed("GEMINI_")
        .from_env::<GeminiSettings>()
        .map_err(|e| format!("Failed to parse GEMINI_* variables: {e}"))?;

    Ok(Config {
        port: server.port,
        gemini,
    })
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path =
        env::var("REPLY_ASSISTANT_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return from_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'\
             \n This file should not be used and should be replaced with actual data",
            config_path
        );
        return from_file("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Successfully loaded configuration from environment variables");
            Ok(config)
        }
        Err(e) => Err(format!(
            "Config file not found and environment variables are invalid. \
             Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
             Error: {e}"
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.gemini.api_base, DEFAULT_API_BASE);
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert!(config.gemini.api_key().is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let yaml = "port: 9100\ngemini:\n  api_key: secret\n  model: gemini-2.0-flash\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.gemini.api_key(), Some("secret"));
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let settings = GeminiSettings {
            api_key: Some("   ".to_string()),
            ..GeminiSettings::default()
        };
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn env_key_fills_missing_file_key() {
        let config: Config = serde_yaml::from_str("port: 8001").unwrap();
        let config = with_env_overlay(
            config,
            GeminiOverlay {
                api_key: Some("from-env".to_string()),
                ..GeminiOverlay::default()
            },
        );
        assert_eq!(config.gemini.api_key(), Some("from-env"));
    }

    #[test]
    fn env_overrides_file_values() {
        let yaml = "gemini:\n  api_key: from-file\n  api_base: https://example.com/v1\n  model: gemini-1.5-pro\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let config = with_env_overlay(
            config,
            GeminiOverlay {
                api_key: Some("from-env".to_string()),
                api_base: Some("http://localhost:9/v1".to_string()),
                model: Some("gemini-2.0-flash".to_string()),
            },
        );
        assert_eq!(config.gemini.api_key(), Some("from-env"));
        assert_eq!(config.gemini.api_base, "http://localhost:9/v1");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
    }

    #[test]
    fn env_overrides_shipped_example_file() {
        let contents = include_str!("../config.example.yaml");
        let config: Config = serde_yaml::from_str(contents).unwrap();
        let config = with_env_overlay(
            config,
            GeminiOverlay {
                model: Some("gemini-2.0-flash".to_string()),
                ..GeminiOverlay::default()
            },
        );
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn blank_env_values_keep_file_values() {
        let yaml = "gemini:\n  api_key: from-file\n  model: gemini-2.0-flash\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let config = with_env_overlay(
            config,
            GeminiOverlay {
                api_key: Some(String::new()),
                api_base: Some("  ".to_string()),
                model: None,
            },
        );
        assert_eq!(config.gemini.api_key(), Some("from-file"));
        assert_eq!(config.gemini.api_base, DEFAULT_API_BASE);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
    }
}
