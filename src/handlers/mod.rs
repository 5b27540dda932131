//! Request handlers module
//!
//! - `intake`: the per-sender intake dispatcher
//! - `webhook`: HTTP endpoints Twilio calls

pub mod intake;
pub mod webhook;

pub use intake::{DeliveryStatus, IntakeDispatcher, IntakeOutcome};
pub use webhook::{create_router, AppState, InboundSms};
