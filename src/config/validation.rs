//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::settings::{TWILIO_ACCOUNT_SID_VAR, TWILIO_AUTH_TOKEN_VAR, TWILIO_PHONE_NUMBER_VAR};
use super::Settings;
use crate::utils::errors::{IntakeError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_twilio_config(&settings.twilio)?;
    validate_server_config(&settings.server)?;
    validate_intake_config(&settings.intake)?;
    validate_state_config(&settings.state)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate Twilio configuration
fn validate_twilio_config(config: &super::TwilioConfig) -> Result<()> {
    let missing: Vec<&str> = [
        (TWILIO_ACCOUNT_SID_VAR, &config.account_sid),
        (TWILIO_AUTH_TOKEN_VAR, &config.auth_token),
        (TWILIO_PHONE_NUMBER_VAR, &config.phone_number),
    ]
    .iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| *name)
    .collect();

    if !missing.is_empty() {
        return Err(IntakeError::Config(format!(
            "Please set the {} environment variable(s)",
            missing.join(", ")
        )));
    }

    let base_url = url::Url::parse(&config.api_base_url)?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(IntakeError::Config(format!(
            "Twilio API URL must be http(s): {}",
            config.api_base_url
        )));
    }

    if config.timeout_seconds == 0 {
        return Err(IntakeError::Config(
            "Twilio timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate webhook server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(IntakeError::Config("Server host is required".to_string()));
    }

    if config.port == 0 {
        return Err(IntakeError::Config(
            "Server port must be greater than 0".to_string(),
        ));
    }

    if !config.webhook_path.starts_with('/') {
        return Err(IntakeError::Config(format!(
            "Webhook path must start with '/': {}",
            config.webhook_path
        )));
    }

    if config.webhook_path == crate::handlers::webhook::HEALTH_PATH {
        return Err(IntakeError::Config(format!(
            "Webhook path cannot be {}",
            crate::handlers::webhook::HEALTH_PATH
        )));
    }

    Ok(())
}

/// Validate intake wording
fn validate_intake_config(config: &super::IntakeConfig) -> Result<()> {
    if config.practice_name.trim().is_empty() {
        return Err(IntakeError::Config("Practice name is required".to_string()));
    }

    if config.agent_name.trim().is_empty() {
        return Err(IntakeError::Config("Agent name is required".to_string()));
    }

    if config.identifier_label.trim().is_empty() {
        return Err(IntakeError::Config(
            "Identifier label is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate conversation state configuration
fn validate_state_config(config: &super::StateConfig) -> Result<()> {
    if config.ttl_seconds == Some(0) {
        return Err(IntakeError::Config(
            "Conversation TTL must be greater than 0 when set".to_string(),
        ));
    }

    if let Some(seconds) = config.ttl_seconds {
        let expiry = config
            .ttl()
            .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl));
        if expiry.is_none() {
            return Err(IntakeError::Config(format!(
                "Conversation TTL is out of range: {} seconds",
                seconds
            )));
        }
    }

    if config.cleanup_interval_seconds == 0 {
        return Err(IntakeError::Config(
            "Cleanup interval must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(IntakeError::Config("Log level is required".to_string()));
    }

    if let Err(e) = tracing_subscriber::EnvFilter::try_new(&config.level) {
        return Err(IntakeError::Config(format!(
            "Invalid log level {:?}: {}",
            config.level, e
        )));
    }

    Ok(())
}
