//! SMS delivery service implementation
//!
//! This service sends outbound text messages through the Twilio Messages API,
//! including HTTP client setup, request authentication, response parsing and
//! error mapping. Nothing here retries; callers decide what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TwilioConfig;
use crate::utils::errors::{IntakeError, Result, TwilioError, TwilioResult};
use crate::utils::helpers::mask_address;

/// Provider acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id
    pub sid: String,
    pub status: Option<String>,
}

/// Capability to deliver a text message to an address
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `body` to `to`, originating from `from`
    async fn send_sms(&self, to: &str, from: &str, body: &str) -> Result<DeliveryReceipt>;
}

/// Twilio error payload
#[derive(Debug, Clone, Deserialize)]
struct TwilioErrorResponse {
    code: Option<i64>,
    message: Option<String>,
}

/// Twilio Messages API client
#[derive(Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    messages_url: String,
}

impl TwilioClient {
    /// Create a new TwilioClient instance
    pub fn new(config: &TwilioConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("LivIntake/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(IntakeError::Http)?;

        let messages_url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base_url.trim_end_matches('/'),
            config.account_sid
        );

        Ok(Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            messages_url,
        })
    }

    /// Endpoint messages are posted to
    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    async fn create_message(&self, to: &str, from: &str, body: &str) -> TwilioResult<DeliveryReceipt> {
        debug!(to = %mask_address(to), body_length = body.len(), "Making Twilio API request");

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TwilioError::Timeout
                } else if e.is_connect() {
                    TwilioError::ServiceUnavailable
                } else {
                    TwilioError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<TwilioErrorResponse>(&error_text) {
                Ok(parsed) => (parsed.code, parsed.message.unwrap_or(error_text)),
                Err(_) => (None, error_text),
            };
            return Err(TwilioError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        response
            .json::<DeliveryReceipt>()
            .await
            .map_err(|e| TwilioError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send_sms(&self, to: &str, from: &str, body: &str) -> Result<DeliveryReceipt> {
        Ok(self.create_message(to, from, body).await?)
    }
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("account_sid", &self.account_sid)
            .field("messages_url", &self.messages_url)
            .finish_non_exhaustive()
    }
}
