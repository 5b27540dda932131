//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Environment variables Twilio's own tooling uses for credentials
pub const TWILIO_ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";
pub const TWILIO_PHONE_NUMBER_VAR: &str = "TWILIO_PHONE_NUMBER";

/// Prefix for nested overrides, e.g. `LIVINTAKE__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "LIVINTAKE";

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub twilio: TwilioConfig,
    pub intake: IntakeConfig,
    pub state: StateConfig,
    pub logging: LoggingConfig,
}

/// Webhook server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub webhook_path: String,
}

/// Twilio account and sender configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Origin number every reply is sent from
    pub phone_number: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

/// Wording of the intake conversation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntakeConfig {
    pub practice_name: String,
    pub agent_name: String,
    /// What the patient identifier is called, e.g. "OHIP number"
    pub identifier_label: String,
}

/// Conversation state configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    /// Idle conversations are forgotten after this many seconds; unset keeps them forever
    pub ttl_seconds: Option<u64>,
    pub cleanup_interval_seconds: u64,
}

impl StateConfig {
    /// Conversation TTL; `None` when unset or not representable as a duration
    pub fn ttl(&self) -> Option<chrono::Duration> {
        self.ttl_seconds
            .and_then(|seconds| i64::try_from(seconds).ok())
            .and_then(chrono::Duration::try_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Level or filter directives, e.g. `info,tower_http=debug`
    pub level: String,
    /// Directory for daily-rolling log files; stdout only when unset
    pub file_path: Option<String>,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings using `path` (extension optional) as the configuration file
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("twilio.account_sid", env_value(TWILIO_ACCOUNT_SID_VAR))?
            .set_override_option("twilio.auth_token", env_value(TWILIO_AUTH_TOKEN_VAR))?
            .set_override_option("twilio.phone_number", env_value(TWILIO_PHONE_NUMBER_VAR))?
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::IntakeError> {
        super::validation::validate_settings(self)
    }

    /// Address the webhook server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Read an environment variable, treating empty values as unset
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                webhook_path: "/sms".to_string(),
            },
            twilio: TwilioConfig {
                account_sid: String::new(),
                auth_token: String::new(),
                phone_number: String::new(),
                api_base_url: "https://api.twilio.com".to_string(),
                timeout_seconds: 10,
            },
            intake: IntakeConfig {
                practice_name: "our medical practice".to_string(),
                agent_name: "LiV".to_string(),
                identifier_label: "OHIP number".to_string(),
            },
            state: StateConfig {
                ttl_seconds: None,
                cleanup_interval_seconds: 300,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
        }
    }
}
