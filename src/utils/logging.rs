//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the LivIntake application. Phone numbers are always masked before they
//! reach a log line.

use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::helpers::mask_address;
use crate::config::LoggingConfig;
use crate::utils::errors::{IntakeError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| IntakeError::Logging(e.to_string()))?;

    let (file_layer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "livintake.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let installed = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    installed.map_err(|e| IntakeError::Logging(e.to_string()))?;

    info!(level = %config.level, json = config.json, file_path = ?config.file_path, "Logging initialized");
    Ok(guard)
}

/// Log an inbound message before it is dispatched
pub fn log_inbound_message(sender: &str, stage: Option<&str>, body_length: usize) {
    info!(
        sender = %mask_address(sender),
        stage = stage.unwrap_or("not_started"),
        body_length = body_length,
        "Inbound SMS received"
    );
}

/// Log a conversation moving between stages
pub fn log_stage_transition(sender: &str, from: Option<&str>, to: Option<&str>) {
    debug!(
        sender = %mask_address(sender),
        from = from.unwrap_or("not_started"),
        to = to.unwrap_or("not_started"),
        "Intake stage transition"
    );
}

/// Log a reply accepted by the provider
pub fn log_delivery(recipient: &str, delivery_id: &str) {
    info!(
        recipient = %mask_address(recipient),
        delivery_id = delivery_id,
        "SMS sent"
    );
}

/// Log a reply the provider did not accept; the conversation continues regardless
pub fn log_delivery_failure(recipient: &str, stage: Option<&str>, error: &IntakeError) {
    error!(
        recipient = %mask_address(recipient),
        stage = stage.unwrap_or("not_started"),
        severity = %error.severity(),
        recoverable = error.is_recoverable(),
        error = %error,
        "Error sending SMS"
    );
}

/// Log the end of an intake
pub fn log_intake_completed(sender: &str, answered_fields: usize) {
    info!(
        sender = %mask_address(sender),
        answered_fields = answered_fields,
        "Patient intake completed"
    );
}
