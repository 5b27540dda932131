//! In-process SMS sender for testing
//!
//! Records every message instead of delivering it, and can be told to fail
//! so delivery-failure behavior can be exercised without a network.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use LivIntake::services::{DeliveryReceipt, SmsSender};
use LivIntake::utils::errors::{IntakeError, Result, TwilioError};

/// A message handed to the sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub from: String,
    pub body: String,
}

/// Sender that records outbound messages
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentSms>>,
    fail_all: AtomicBool,
    failing_recipients: Mutex<HashSet<String>>,
    counter: AtomicUsize,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Make sends to one recipient fail
    pub fn fail_for(&self, recipient: &str) {
        self.failing_recipients.lock().unwrap().insert(recipient.to_string());
    }

    /// Every attempted message, including failed ones, in order
    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }

    /// Bodies of messages attempted to `recipient`, in order
    pub fn bodies_for(&self, recipient: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|sms| sms.to == recipient)
            .map(|sms| sms.body)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send_sms(&self, to: &str, from: &str, body: &str) -> Result<DeliveryReceipt> {
        self.sent.lock().unwrap().push(SentSms {
            to: to.to_string(),
            from: from.to_string(),
            body: body.to_string(),
        });

        let failing = self.fail_all.load(Ordering::SeqCst)
            || self.failing_recipients.lock().unwrap().contains(to);
        if failing {
            return Err(IntakeError::Delivery(TwilioError::Api {
                status: 400,
                code: Some(21610),
                message: "Attempt to send to unsubscribed recipient".to_string(),
            }));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(DeliveryReceipt {
            sid: format!("SM{:032}", n),
            status: Some("queued".to_string()),
        })
    }
}
