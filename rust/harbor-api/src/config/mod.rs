//! Configuration management for Harbor API.
//!
//! Configuration is loaded from defaults, an optional config file, and
//! environment variables (in that order). Upstream synthesis credentials
//! are never read from ambient globals at request time; they land in
//! [`AppConfig`] once at startup and are passed to the relay explicitly.

use serde::{Deserialize, Serialize};

use crate::synthesis::SynthesisSettings;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream synthesis configuration.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment and config files.
    ///
    /// Sources, in order: built-in defaults, `config/harbor` (optional),
    /// `HARBOR__`-prefixed environment variables, then the well-known
    /// provider variables (`ELEVENLABS_API_KEY`, `ELEVENLABS_BASE_URL`).
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(config::File::with_name("config/harbor").required(false))
            .add_source(
                config::Environment::with_prefix("HARBOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize().unwrap_or_default();

        // Provider credentials
        if let Ok(key) = std::env::var("ELEVENLABS_API_KEY") {
            app_config.synthesis.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("ELEVENLABS_BASE_URL") {
            app_config.synthesis.base_url = url;
        }

        Ok(app_config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Main API port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in seconds. Bounds handler time, not the lifetime
    /// of a committed streaming body.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Upstream synthesis configuration.
///
/// The voice, model, and output format defaults match the provider values
/// the platform has always used; deployments may override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Provider base URL.
    #[serde(default = "default_synthesis_base_url")]
    pub base_url: String,
    /// Provider API key.
    pub api_key: Option<String>,
    /// Voice used when a request does not name one.
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,
    /// Synthesis model identifier.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Audio output encoding.
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Bound on how long opening the upstream stream may hang.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_synthesis_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_model_id() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_output_format() -> String {
    "mp3_44100_128".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: default_synthesis_base_url(),
            api_key: None,
            default_voice_id: default_voice_id(),
            model_id: default_model_id(),
            output_format: default_output_format(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl From<&SynthesisConfig> for SynthesisSettings {
    fn from(config: &SynthesisConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_voice_id: config.default_voice_id.clone(),
            model_id: config.model_id.clone(),
            output_format: config.output_format.clone(),
            connect_timeout_secs: config.connect_timeout_secs,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to use JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn defaults_match_platform_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.synthesis.default_voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(config.synthesis.model_id, "eleven_monolingual_v1");
        assert_eq!(config.synthesis.output_format, "mp3_44100_128");
        assert!(config.synthesis.api_key.is_none());
    }

    #[test]
    #[serial]
    fn env_overrides_api_key() {
        std::env::set_var("ELEVENLABS_API_KEY", "test-key");
        let config = AppConfig::load().unwrap();
        assert_eq!(config.synthesis.api_key.as_deref(), Some("test-key"));
        std::env::remove_var("ELEVENLABS_API_KEY");
    }
}
