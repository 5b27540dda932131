//! Conversation context management
//!
//! This module tracks where each sender is in the intake conversation and the
//! answers they have given so far.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Keys under which intake answers are stored
pub mod fields {
    pub const NAME: &str = "name";
    pub const IDENTIFIER: &str = "identifier";
    pub const APPOINTMENT_TYPE: &str = "appointment_type";
}

/// Position of a sender within the intake
///
/// A sender with no stored context has not started (or has finished) an intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AwaitingName,
    AwaitingIdentifier,
    AwaitingAppointmentType,
    AwaitingComplaint,
}

impl Stage {
    /// Stable tag used when the stage is stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AwaitingName => "awaiting_name",
            Stage::AwaitingIdentifier => "awaiting_identifier",
            Stage::AwaitingAppointmentType => "awaiting_appointment_type",
            Stage::AwaitingComplaint => "awaiting_complaint",
        }
    }

    /// Decode a stored tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "awaiting_name" => Some(Stage::AwaitingName),
            "awaiting_identifier" => Some(Stage::AwaitingIdentifier),
            "awaiting_appointment_type" => Some(Stage::AwaitingAppointmentType),
            "awaiting_complaint" => Some(Stage::AwaitingComplaint),
            _ => None,
        }
    }

    /// Stage that follows this one; `None` once the intake is complete
    pub fn next(&self) -> Option<Self> {
        match self {
            Stage::AwaitingName => Some(Stage::AwaitingIdentifier),
            Stage::AwaitingIdentifier => Some(Stage::AwaitingAppointmentType),
            Stage::AwaitingAppointmentType => Some(Stage::AwaitingComplaint),
            Stage::AwaitingComplaint => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-sender conversation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Sender address this context belongs to
    pub sender: String,
    /// Stored stage tag, see [`Stage::as_str`]
    pub step: String,
    /// Answers collected so far
    pub data: HashMap<String, String>,
    /// When this context expires (for cleanup)
    pub expires_at: Option<DateTime<Utc>>,
    /// When this context was last updated
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Create a new context positioned at `stage`
    pub fn new(sender: &str, stage: Stage) -> Self {
        Self {
            sender: sender.to_string(),
            step: stage.as_str().to_string(),
            data: HashMap::new(),
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Current stage, or `None` if the stored tag is not recognised
    pub fn stage(&self) -> Option<Stage> {
        Stage::from_tag(&self.step)
    }

    /// Move to another stage
    pub fn advance_to(&mut self, stage: Stage) {
        self.step = stage.as_str().to_string();
        self.updated_at = Utc::now();
    }

    /// Record an answer
    pub fn set_data(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
        self.updated_at = Utc::now();
    }

    /// Look up an answer
    pub fn get_data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Check if context has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against a given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }

    /// Push the expiry `ttl` past now, or clear it when there is no TTL
    pub fn refresh_expiry(&mut self, ttl: Option<Duration>) {
        self.expires_at = ttl.and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context() {
        let context = ConversationContext::new("+15551234567", Stage::AwaitingName);
        assert_eq!(context.sender, "+15551234567");
        assert_eq!(context.stage(), Some(Stage::AwaitingName));
        assert!(context.data.is_empty());
        assert!(context.expires_at.is_none());
    }

    #[test]
    fn test_stage_tags_round_trip() {
        let mut stage = Some(Stage::AwaitingName);
        let mut seen = Vec::new();
        while let Some(current) = stage {
            assert_eq!(Stage::from_tag(current.as_str()), Some(current));
            seen.push(current);
            stage = current.next();
        }
        assert_eq!(
            seen,
            vec![
                Stage::AwaitingName,
                Stage::AwaitingIdentifier,
                Stage::AwaitingAppointmentType,
                Stage::AwaitingComplaint,
            ]
        );
    }

    #[test]
    fn test_unknown_tag() {
        let mut context = ConversationContext::new("+15551234567", Stage::AwaitingName);
        context.step = "waiting_for_insurance".to_string();
        assert_eq!(context.stage(), None);
    }

    #[test]
    fn test_data_operations() {
        let mut context = ConversationContext::new("+15551234567", Stage::AwaitingIdentifier);
        context.set_data(fields::NAME, "Jane Doe");

        assert_eq!(context.get_data(fields::NAME), Some("Jane Doe"));
        assert_eq!(context.get_data(fields::IDENTIFIER), None);
    }

    #[test]
    fn test_expiry() {
        let mut context = ConversationContext::new("+15551234567", Stage::AwaitingName);

        context.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(context.is_expired());

        context.refresh_expiry(Some(Duration::hours(1)));
        assert!(!context.is_expired());
        assert!(context.is_expired_at(Utc::now() + Duration::hours(2)));

        context.refresh_expiry(None);
        assert!(context.expires_at.is_none());
        assert!(!context.is_expired());
    }

    #[test]
    fn test_serialized_stage_tag() {
        let json = serde_json::to_string(&Stage::AwaitingAppointmentType).unwrap();
        assert_eq!(json, "\"awaiting_appointment_type\"");
    }
}
