//! State management module
//!
//! This module handles conversation state for each sender

pub mod context;
pub mod scenarios;
pub mod storage;

// Re-export commonly used state components
pub use context::{ConversationContext, Stage};
pub use scenarios::{ContextUpdate, IntakeScenario, IntakeSummary, StepDecision, StepKind};
pub use storage::{ConversationStore, InMemoryStateStorage, StateStorageManager, StorageStats};
