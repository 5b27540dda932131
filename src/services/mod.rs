//! Services module
//!
//! This module wires the delivery service, state storage and intake
//! dispatcher together from settings.

pub mod sms;

// Re-export commonly used services
pub use sms::{DeliveryReceipt, SmsSender, TwilioClient};

use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::Settings;
use crate::handlers::{AppState, IntakeDispatcher};
use crate::messages::MessageCatalog;
use crate::state::{ConversationStore, InMemoryStateStorage, IntakeScenario, StateStorageManager};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub settings: Settings,
    pub sms_sender: Arc<dyn SmsSender>,
    pub state_storage: Arc<dyn ConversationStore>,
    pub dispatcher: IntakeDispatcher,
}

impl ServiceFactory {
    /// Create a new ServiceFactory delivering through Twilio
    pub fn new(settings: Settings) -> Result<Self> {
        let twilio = TwilioClient::new(&settings.twilio)?;
        Ok(Self::with_sender(settings, Arc::new(twilio)))
    }

    /// Create a ServiceFactory around any delivery capability
    pub fn with_sender(settings: Settings, sms_sender: Arc<dyn SmsSender>) -> Self {
        let state_storage: Arc<dyn ConversationStore> = Arc::new(InMemoryStateStorage::new());
        let scenario = IntakeScenario::new(MessageCatalog::new(&settings.intake));
        let ttl = settings.state.ttl();

        let dispatcher = IntakeDispatcher::new(
            scenario,
            state_storage.clone(),
            sms_sender.clone(),
            settings.twilio.phone_number.clone(),
        )
        .with_ttl(ttl);

        Self {
            settings,
            sms_sender,
            state_storage,
            dispatcher,
        }
    }

    /// Shared state for the webhook router
    pub fn app_state(&self) -> AppState {
        AppState::new(self.dispatcher.clone())
    }

    /// Storage manager that sweeps expired conversations; running only when a TTL is configured
    pub fn storage_manager(&self) -> StateStorageManager {
        let mut manager = StateStorageManager::new(
            self.state_storage.clone(),
            Duration::from_secs(self.settings.state.cleanup_interval_seconds),
        );
        if self.settings.state.ttl().is_some() {
            manager.start_cleanup();
        }
        manager
    }
}

impl std::fmt::Debug for ServiceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceFactory")
            .field("settings", &self.settings)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
