//! Inbound webhook endpoints
//!
//! Twilio posts every inbound SMS as a form-encoded request. The response is
//! always an empty `200 OK`: replies go out through the Messages API, never
//! in the webhook response, and failures are not reported back to Twilio.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, warn, Instrument};

use super::intake::IntakeDispatcher;
use crate::utils::helpers::generate_request_id;

/// Path of the health endpoint
pub const HEALTH_PATH: &str = "/health";

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: IntakeDispatcher,
}

impl AppState {
    pub fn new(dispatcher: IntakeDispatcher) -> Self {
        Self { dispatcher }
    }
}

/// Fields of Twilio's inbound message webhook that the intake uses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundSms {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_conversations: usize,
}

/// Create the webhook router
pub fn create_router(state: AppState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(incoming_sms))
        .route(HEALTH_PATH, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle an inbound SMS
async fn incoming_sms(
    State(state): State<AppState>,
    payload: Result<Form<InboundSms>, FormRejection>,
) -> StatusCode {
    let request_id = generate_request_id();

    let InboundSms { from, body } = match payload {
        Ok(Form(payload)) => payload,
        Err(rejection) => {
            warn!(request_id = %request_id, error = %rejection, "Unreadable webhook payload, ignoring");
            return StatusCode::OK;
        }
    };

    if from.trim().is_empty() {
        warn!(request_id = %request_id, "Webhook payload has no sender, ignoring");
        return StatusCode::OK;
    }

    // Run to completion even if Twilio drops the connection mid-request
    let dispatcher = state.dispatcher.clone();
    let span = info_span!("inbound_sms", request_id = %request_id);
    let task = tokio::spawn(
        async move { dispatcher.handle_inbound_message(&from, &body).await }.instrument(span),
    );

    if let Err(e) = task.await {
        error!(request_id = %request_id, error = %e, "Intake task failed");
    }

    StatusCode::OK
}

/// Liveness and conversation count
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let stats = state.dispatcher.storage().get_stats().await.map_err(|e| {
        error!(error = %e, "Failed to read storage stats");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        active_conversations: stats.active_contexts,
    }))
}
