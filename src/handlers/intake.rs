//! Intake dispatcher
//!
//! Maps one inbound (sender, body) pair to exactly one outbound reply and one
//! state transition. Messages from the same sender are processed one at a
//! time; different senders proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OwnedMutexGuard;
use tracing::{error, warn};

use crate::services::sms::{DeliveryReceipt, SmsSender};
use crate::state::{ContextUpdate, ConversationStore, IntakeScenario, Stage, StepKind};
use crate::utils::logging;

/// Whether the reply reached the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent(DeliveryReceipt),
    Failed(String),
}

/// Report of one handled message
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub reply: String,
    pub step: StepKind,
    /// Stage the sender is in after this message; `None` when no recognised stage is stored
    pub stage: Option<Stage>,
    pub delivery: DeliveryStatus,
}

impl IntakeOutcome {
    pub fn delivered(&self) -> bool {
        matches!(self.delivery, DeliveryStatus::Sent(_))
    }
}

/// A sender's async lock and how many callers hold or wait on it
#[derive(Debug, Default)]
struct SenderLock {
    mutex: Arc<tokio::sync::Mutex<()>>,
    users: usize,
}

/// Per-sender async locks
#[derive(Debug, Default)]
struct SenderLocks {
    locks: Mutex<HashMap<String, SenderLock>>,
}

impl SenderLocks {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, SenderLock>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn acquire(self: &Arc<Self>, sender: &str) -> SenderGuard {
        let mutex = {
            let mut locks = self.entries();
            let entry = locks.entry(sender.to_string()).or_default();
            entry.users += 1;
            entry.mutex.clone()
        };

        // Registered before waiting so a cancelled wait still gives its slot back
        let mut guard = SenderGuard {
            locks: Arc::clone(self),
            sender: sender.to_string(),
            held: None,
        };
        guard.held = Some(mutex.lock_owned().await);
        guard
    }

    /// Drop the sender's lock once nobody holds or waits on it
    fn release(&self, sender: &str) {
        let mut locks = self.entries();
        if let Some(entry) = locks.get_mut(sender) {
            entry.users = entry.users.saturating_sub(1);
            if entry.users == 0 {
                locks.remove(sender);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}

/// Holds a sender's lock; releases it on drop, including on cancellation or panic
struct SenderGuard {
    locks: Arc<SenderLocks>,
    sender: String,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for SenderGuard {
    fn drop(&mut self) {
        self.held.take();
        self.locks.release(&self.sender);
    }
}

/// Drives the intake conversation for every sender
#[derive(Clone)]
pub struct IntakeDispatcher {
    scenario: Arc<IntakeScenario>,
    storage: Arc<dyn ConversationStore>,
    sms_sender: Arc<dyn SmsSender>,
    origin_number: String,
    ttl: Option<chrono::Duration>,
    locks: Arc<SenderLocks>,
}

impl IntakeDispatcher {
    pub fn new(
        scenario: IntakeScenario,
        storage: Arc<dyn ConversationStore>,
        sms_sender: Arc<dyn SmsSender>,
        origin_number: String,
    ) -> Self {
        Self {
            scenario: Arc::new(scenario),
            storage,
            sms_sender,
            origin_number,
            ttl: None,
            locks: Arc::new(SenderLocks::default()),
        }
    }

    /// Expire conversations left idle for `ttl`
    pub fn with_ttl(mut self, ttl: Option<chrono::Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn storage(&self) -> &Arc<dyn ConversationStore> {
        &self.storage
    }

    /// Number of senders currently holding or waiting on a lock
    pub fn in_flight_senders(&self) -> usize {
        self.locks.len()
    }

    /// Handle one inbound message
    ///
    /// Never fails: store and delivery errors are logged, and the conversation
    /// advances whether or not the reply was delivered.
    pub async fn handle_inbound_message(&self, sender: &str, body: &str) -> IntakeOutcome {
        let _guard = self.locks.acquire(sender).await;
        self.process(sender, body.trim()).await
    }

    async fn process(&self, sender: &str, input: &str) -> IntakeOutcome {
        let current = match self.storage.load_context(sender).await {
            Ok(context) => context,
            Err(e) => {
                error!(error = %e, "Failed to load conversation context, treating sender as new");
                None
            }
        };
        let previous_step = current.as_ref().map(|context| context.step.clone());
        logging::log_inbound_message(sender, previous_step.as_deref(), input.len());

        let decision = self.scenario.decide(sender, current, input);
        let stage = decision.next_stage();

        let delivery = match self
            .sms_sender
            .send_sms(sender, &self.origin_number, &decision.reply)
            .await
        {
            Ok(receipt) => {
                logging::log_delivery(sender, &receipt.sid);
                DeliveryStatus::Sent(receipt)
            }
            Err(e) => {
                logging::log_delivery_failure(sender, previous_step.as_deref(), &e);
                DeliveryStatus::Failed(e.to_string())
            }
        };

        let stored = match decision.update {
            ContextUpdate::Save(mut context) => {
                context.refresh_expiry(self.ttl);
                self.storage.save_context(&context).await
            }
            ContextUpdate::Delete => self.storage.delete_context(sender).await,
            ContextUpdate::Keep => Ok(()),
        };
        if let Err(e) = stored {
            error!(error = %e, "Failed to store conversation context");
        }

        match &decision.kind {
            StepKind::Completed(summary) => {
                logging::log_stage_transition(sender, previous_step.as_deref(), None);
                logging::log_intake_completed(sender, summary.answered_fields());
            }
            StepKind::Unrecognized { step } => {
                warn!(step = %step, "Unknown conversation state");
            }
            StepKind::Started | StepKind::Advanced { .. } => {
                logging::log_stage_transition(
                    sender,
                    previous_step.as_deref(),
                    stage.map(|stage| stage.as_str()),
                );
            }
        }

        IntakeOutcome {
            reply: decision.reply,
            step: decision.kind,
            stage,
            delivery,
        }
    }
}

impl std::fmt::Debug for IntakeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeDispatcher")
            .field("storage", &self.storage)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
