//! Reply catalog for the intake conversation
//!
//! Every outbound SMS the service sends is rendered here from a fixed template
//! and the practice wording in [`IntakeConfig`].

use crate::config::IntakeConfig;
use crate::utils::helpers::render_template;

const GREETING: &str = "Hello! Welcome to {practice_name}. My name is {agent_name}, your virtual intake agent. Please reply with your name.";
const ASK_IDENTIFIER: &str = "Thank you, {name}! Please reply with your {identifier_label}.";
const ASK_APPOINTMENT_TYPE: &str = "Thank you for your {identifier_label}: {identifier}. What type of appointment are you looking for today? (e.g., consultation, follow-up)";
const ASK_COMPLAINT: &str = "You are requesting a '{appointment_type}' appointment. Next available appointment time will be confirmed shortly by our staff. Please briefly describe the reason for your visit.";
const COMPLETED: &str = "Thank you for the summary: {complaint}. This information will be shared with your care provider. Thank you for completing the initial intake. Our team will be in touch soon with further details.";
const NOT_UNDERSTOOD: &str = "Sorry, I'm not sure how to process that. Please try again or contact our office directly.";

/// Renders the canned replies of the intake flow
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    practice_name: String,
    agent_name: String,
    identifier_label: String,
}

impl MessageCatalog {
    /// Create a catalog using the configured practice wording
    pub fn new(config: &IntakeConfig) -> Self {
        Self {
            practice_name: config.practice_name.clone(),
            agent_name: config.agent_name.clone(),
            identifier_label: config.identifier_label.clone(),
        }
    }

    /// First reply of a new intake
    pub fn greeting(&self) -> String {
        render_template(
            GREETING,
            &[("practice_name", &self.practice_name), ("agent_name", &self.agent_name)],
        )
    }

    /// Reply to the patient's name
    pub fn ask_identifier(&self, name: &str) -> String {
        render_template(
            ASK_IDENTIFIER,
            &[("name", name), ("identifier_label", &self.identifier_label)],
        )
    }

    /// Reply to the patient's identifier
    pub fn ask_appointment_type(&self, identifier: &str) -> String {
        render_template(
            ASK_APPOINTMENT_TYPE,
            &[("identifier", identifier), ("identifier_label", &self.identifier_label)],
        )
    }

    /// Reply to the requested appointment type
    pub fn ask_complaint(&self, appointment_type: &str) -> String {
        render_template(ASK_COMPLAINT, &[("appointment_type", appointment_type)])
    }

    /// Final reply, sent once the reason for the visit is known
    pub fn completed(&self, complaint: &str) -> String {
        render_template(COMPLETED, &[("complaint", complaint)])
    }

    pub fn not_understood(&self) -> String {
        NOT_UNDERSTOOD.to_string()
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new(&crate::config::Settings::default().intake)
    }
}
