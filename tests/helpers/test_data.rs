//! Test data for intake scenarios

use std::sync::Arc;

use fake::faker::name::en::Name;
use fake::Fake;
use LivIntake::services::SmsSender;
use LivIntake::{IntakeDispatcher, ServiceFactory, Settings};

pub const TEST_ACCOUNT_SID: &str = "AC0123456789abcdef0123456789abcdef";
pub const TEST_AUTH_TOKEN: &str = "test_auth_token";
pub const TEST_ORIGIN_NUMBER: &str = "+15550001111";
pub const TEST_SENDER: &str = "+15551234567";
pub const OTHER_SENDER: &str = "+15557654321";

/// Settings with Twilio credentials filled in
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.twilio.account_sid = TEST_ACCOUNT_SID.to_string();
    settings.twilio.auth_token = TEST_AUTH_TOKEN.to_string();
    settings.twilio.phone_number = TEST_ORIGIN_NUMBER.to_string();
    settings
}

/// Settings pointing the Twilio client at a mock server
pub fn test_settings_for(api_base_url: &str) -> Settings {
    let mut settings = test_settings();
    settings.twilio.api_base_url = api_base_url.to_string();
    settings.twilio.timeout_seconds = 2;
    settings
}

/// Dispatcher delivering through `sender`
pub fn test_dispatcher(sender: Arc<dyn SmsSender>) -> IntakeDispatcher {
    ServiceFactory::with_sender(test_settings(), sender).dispatcher
}

/// A random patient name
pub fn fake_patient_name() -> String {
    Name().fake()
}

/// Answers for one full intake, starting with the opening message
pub fn sample_intake() -> [&'static str; 5] {
    ["hi", "Jane Doe", "1234-567-890-AB", "follow-up", "knee pain"]
}
