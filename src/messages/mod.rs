//! Outbound message wording

pub mod catalog;

pub use catalog::MessageCatalog;
