//! Intake scenario implementation
//!
//! The intake is a fixed, linear scenario: greeting, name, identifier,
//! appointment type, reason for visit. Every message advances it by exactly
//! one step regardless of content. This module decides the reply and the
//! next context for a message; it performs no I/O.

use serde::Serialize;

use super::context::{fields, ConversationContext, Stage};
use crate::messages::MessageCatalog;

/// What a message did to the sender's conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// No conversation existed; a new intake began
    Started,
    /// The conversation moved forward one stage
    Advanced { from: Stage, to: Stage },
    /// The last answer arrived; the conversation was removed
    Completed(IntakeSummary),
    /// The stored stage tag was not recognised; nothing changed
    Unrecognized { step: String },
}

/// How the stored context must change after the reply is sent
#[derive(Debug, Clone)]
pub enum ContextUpdate {
    Save(ConversationContext),
    Delete,
    Keep,
}

/// Reply and state change decided for one inbound message
#[derive(Debug, Clone)]
pub struct StepDecision {
    pub reply: String,
    pub kind: StepKind,
    pub update: ContextUpdate,
}

impl StepDecision {
    /// Stage written by this decision; `None` when the context is deleted or left untouched
    pub fn next_stage(&self) -> Option<Stage> {
        match &self.update {
            ContextUpdate::Save(context) => context.stage(),
            ContextUpdate::Delete => None,
            ContextUpdate::Keep => None,
        }
    }
}

/// Answers gathered over one complete intake
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeSummary {
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub appointment_type: Option<String>,
    pub complaint: String,
}

impl IntakeSummary {
    /// Number of answers present
    pub fn answered_fields(&self) -> usize {
        [&self.name, &self.identifier, &self.appointment_type]
            .iter()
            .filter(|answer| answer.is_some())
            .count()
            + 1
    }
}

/// The intake scenario
#[derive(Debug, Clone, Default)]
pub struct IntakeScenario {
    catalog: MessageCatalog,
}

impl IntakeScenario {
    pub fn new(catalog: MessageCatalog) -> Self {
        Self { catalog }
    }

    /// Decide the reply and next context for a message from `sender`
    ///
    /// `input` is used as-is; callers trim it.
    pub fn decide(&self, sender: &str, current: Option<ConversationContext>, input: &str) -> StepDecision {
        let Some(mut context) = current else {
            return StepDecision {
                reply: self.catalog.greeting(),
                kind: StepKind::Started,
                update: ContextUpdate::Save(ConversationContext::new(sender, Stage::AwaitingName)),
            };
        };

        let Some(stage) = context.stage() else {
            return StepDecision {
                reply: self.catalog.not_understood(),
                kind: StepKind::Unrecognized { step: context.step },
                update: ContextUpdate::Keep,
            };
        };

        let reply = match stage {
            Stage::AwaitingName => {
                context.set_data(fields::NAME, input);
                self.catalog.ask_identifier(input)
            }
            Stage::AwaitingIdentifier => {
                context.set_data(fields::IDENTIFIER, input);
                self.catalog.ask_appointment_type(input)
            }
            Stage::AwaitingAppointmentType => {
                context.set_data(fields::APPOINTMENT_TYPE, input);
                self.catalog.ask_complaint(input)
            }
            Stage::AwaitingComplaint => self.catalog.completed(input),
        };

        match stage.next() {
            Some(next) => {
                context.advance_to(next);
                StepDecision {
                    reply,
                    kind: StepKind::Advanced { from: stage, to: next },
                    update: ContextUpdate::Save(context),
                }
            }
            None => {
                let summary = IntakeSummary {
                    name: context.get_data(fields::NAME).map(str::to_string),
                    identifier: context.get_data(fields::IDENTIFIER).map(str::to_string),
                    appointment_type: context.get_data(fields::APPOINTMENT_TYPE).map(str::to_string),
                    complaint: input.to_string(),
                };
                StepDecision {
                    reply,
                    kind: StepKind::Completed(summary),
                    update: ContextUpdate::Delete,
                }
            }
        }
    }
}
