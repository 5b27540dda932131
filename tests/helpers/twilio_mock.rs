//! Mock Twilio API server for testing
//!
//! This module provides a mock HTTP server that simulates the Twilio Messages
//! API for testing purposes. It uses wiremock to create configurable responses.

use serde_json::{json, Value};
use wiremock::{
    matchers::{basic_auth, header, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

use super::test_data::{TEST_ACCOUNT_SID, TEST_AUTH_TOKEN};

/// Mock Twilio API server for testing
pub struct TwilioMockServer {
    pub server: MockServer,
}

/// Configuration for mock responses
#[derive(Debug, Clone)]
pub struct MockResponseConfig {
    pub success: bool,
    pub delay_ms: Option<u64>,
    pub custom_response: Option<Value>,
}

impl Default for MockResponseConfig {
    fn default() -> Self {
        Self {
            success: true,
            delay_ms: None,
            custom_response: None,
        }
    }
}

impl TwilioMockServer {
    /// Create a new mock Twilio API server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Base URL to configure as `twilio.api_base_url`
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    pub fn messages_path() -> String {
        format!("/2010-04-01/Accounts/{}/Messages.json", TEST_ACCOUNT_SID)
    }

    /// Setup mock for the Messages endpoint
    pub async fn mock_create_message(&self, config: MockResponseConfig) {
        let response_body = config.custom_response.unwrap_or_else(|| {
            if config.success {
                json!({
                    "sid": "SM00000000000000000000000000000001",
                    "account_sid": TEST_ACCOUNT_SID,
                    "status": "queued",
                    "num_segments": "1",
                    "direction": "outbound-api"
                })
            } else {
                json!({
                    "code": 21211,
                    "message": "The 'To' number is not a valid phone number.",
                    "more_info": "https://www.twilio.com/docs/errors/21211",
                    "status": 400
                })
            }
        });

        let mut response = ResponseTemplate::new(if config.success { 201 } else { 400 })
            .set_body_json(response_body);

        if let Some(delay) = config.delay_ms {
            response = response.set_delay(std::time::Duration::from_millis(delay));
        }

        Mock::given(method("POST"))
            .and(path(Self::messages_path()))
            .and(basic_auth(TEST_ACCOUNT_SID, TEST_AUTH_TOKEN))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Setup default successful mocks
    pub async fn setup_default_mocks(&self) {
        self.mock_create_message(MockResponseConfig::default()).await;
    }

    /// Setup error mocks
    pub async fn setup_error_mocks(&self) {
        self.mock_create_message(MockResponseConfig {
            success: false,
            ..MockResponseConfig::default()
        })
        .await;
    }

    /// Setup mocks that answer slower than the client timeout
    pub async fn setup_timeout_mocks(&self, delay_ms: u64) {
        self.mock_create_message(MockResponseConfig {
            delay_ms: Some(delay_ms),
            ..MockResponseConfig::default()
        })
        .await;
    }

    /// Reset all mocks
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// Requests received on the Messages endpoint
    pub async fn message_requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == Self::messages_path())
            .collect()
    }

    /// Form fields of every message request, in order
    pub async fn sent_forms(&self) -> Vec<Vec<(String, String)>> {
        self.message_requests()
            .await
            .iter()
            .map(|request| {
                url::form_urlencoded::parse(&request.body)
                    .into_owned()
                    .collect()
            })
            .collect()
    }
}

/// Look up a field in a decoded form
pub fn form_field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
    form.iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
