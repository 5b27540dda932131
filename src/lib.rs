//! LivIntake SMS intake webhook
//!
//! A Twilio webhook that walks patients of a medical practice through a short
//! intake over SMS: name, identifier, appointment type and reason for visit.
//! Conversation state is kept per phone number in process memory.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod messages;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{IntakeError, Result};

// Re-export main components for easy access
pub use handlers::{create_router, AppState, IntakeDispatcher, IntakeOutcome};
pub use services::{ServiceFactory, SmsSender, TwilioClient};
pub use state::{ConversationStore, InMemoryStateStorage, IntakeScenario, Stage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
