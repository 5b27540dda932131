//! Test helpers module
//!
//! This module provides utilities and helpers for testing the LivIntake application.
//! It includes a mock Twilio API server, an in-process SMS sender and test data.

#![allow(dead_code)]

pub mod recording_sender;
pub mod simple_test;
pub mod test_data;
pub mod twilio_mock;

pub use recording_sender::*;
pub use simple_test::*;
pub use test_data::*;
pub use twilio_mock::*;
