//! State storage implementation
//!
//! This module holds conversation contexts in process memory behind the
//! [`ConversationStore`] interface, including expiration and cleanup.
//! Contexts do not survive a restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::context::ConversationContext;
use crate::utils::errors::Result;
use crate::utils::helpers::mask_address;

/// Keyed storage for conversation contexts
#[async_trait]
pub trait ConversationStore: Send + Sync + std::fmt::Debug {
    /// Load a sender's context; expired contexts read as absent
    async fn load_context(&self, sender: &str) -> Result<Option<ConversationContext>>;

    /// Insert or overwrite a sender's context
    async fn save_context(&self, context: &ConversationContext) -> Result<()>;

    /// Remove a sender's context
    async fn delete_context(&self, sender: &str) -> Result<()>;

    /// Check if context exists for a sender
    async fn context_exists(&self, sender: &str) -> Result<bool> {
        Ok(self.load_context(sender).await?.is_some())
    }

    /// Remove all expired contexts, returning how many were dropped
    async fn cleanup_expired_contexts(&self) -> Result<u32>;

    /// Get storage statistics
    async fn get_stats(&self) -> Result<StorageStats>;
}

/// In-memory state storage
#[derive(Clone, Default)]
pub struct InMemoryStateStorage {
    contexts: Arc<RwLock<HashMap<String, ConversationContext>>>,
}

impl InMemoryStateStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStateStorage {
    async fn load_context(&self, sender: &str) -> Result<Option<ConversationContext>> {
        let context = self.contexts.read().await.get(sender).cloned();

        match context {
            Some(context) if context.is_expired() => {
                warn!(sender = %mask_address(sender), expires_at = ?context.expires_at, "Context has expired, removing");
                let mut contexts = self.contexts.write().await;
                // Only drop it if it was not replaced in the meantime
                if contexts.get(sender).is_some_and(ConversationContext::is_expired) {
                    contexts.remove(sender);
                }
                Ok(None)
            }
            Some(context) => {
                debug!(sender = %mask_address(sender), step = %context.step, "Context loaded");
                Ok(Some(context))
            }
            None => {
                debug!(sender = %mask_address(sender), "No context found");
                Ok(None)
            }
        }
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        debug!(sender = %mask_address(&context.sender), step = %context.step, "Saving context");
        self.contexts
            .write()
            .await
            .insert(context.sender.clone(), context.clone());
        Ok(())
    }

    async fn delete_context(&self, sender: &str) -> Result<()> {
        if self.contexts.write().await.remove(sender).is_some() {
            debug!(sender = %mask_address(sender), "Deleted context");
        } else {
            debug!(sender = %mask_address(sender), "No context to delete");
        }
        Ok(())
    }

    async fn cleanup_expired_contexts(&self) -> Result<u32> {
        let now = chrono::Utc::now();
        let mut contexts = self.contexts.write().await;
        let before = contexts.len();
        contexts.retain(|_, context| !context.is_expired_at(now));
        let cleaned_count = (before - contexts.len()) as u32;

        if cleaned_count > 0 {
            info!("Cleaned up {} expired contexts", cleaned_count);
        }

        Ok(cleaned_count)
    }

    async fn get_stats(&self) -> Result<StorageStats> {
        let now = chrono::Utc::now();
        let contexts = self.contexts.read().await;

        let mut expired_contexts = 0;
        let mut steps_count = HashMap::new();
        for context in contexts.values() {
            if context.is_expired_at(now) {
                expired_contexts += 1;
            } else {
                *steps_count.entry(context.step.clone()).or_insert(0) += 1;
            }
        }

        Ok(StorageStats {
            total_contexts: contexts.len(),
            active_contexts: contexts.len() - expired_contexts,
            expired_contexts,
            steps_count,
        })
    }
}

impl std::fmt::Debug for InMemoryStateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStateStorage").finish_non_exhaustive()
    }
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorageStats {
    pub total_contexts: usize,
    pub active_contexts: usize,
    pub expired_contexts: usize,
    pub steps_count: HashMap<String, u32>,
}

/// State storage manager with automatic cleanup
#[derive(Debug)]
pub struct StateStorageManager {
    storage: Arc<dyn ConversationStore>,
    cleanup_interval: Duration,
    cleanup_handle: Option<tokio::task::JoinHandle<()>>,
}

impl StateStorageManager {
    /// Create a new state storage manager
    pub fn new(storage: Arc<dyn ConversationStore>, cleanup_interval: Duration) -> Self {
        Self {
            storage,
            cleanup_interval,
            cleanup_handle: None,
        }
    }

    /// Start automatic cleanup task
    pub fn start_cleanup(&mut self) {
        if self.cleanup_handle.is_some() {
            warn!("Cleanup task is already running");
            return;
        }

        let storage = self.storage.clone();
        let interval = self.cleanup_interval;

        let handle = tokio::spawn(async move {
            let mut cleanup_interval = tokio::time::interval(interval);

            loop {
                cleanup_interval.tick().await;

                match storage.cleanup_expired_contexts().await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Cleanup task removed {} expired contexts", count);
                        }
                    }
                    Err(e) => {
                        error!("Cleanup task failed: {}", e);
                    }
                }
            }
        });

        self.cleanup_handle = Some(handle);
        info!("Started automatic cleanup task with interval {:?}", self.cleanup_interval);
    }

    /// Stop automatic cleanup task
    pub fn stop_cleanup(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
            info!("Stopped automatic cleanup task");
        }
    }

    pub fn is_running(&self) -> bool {
        self.cleanup_handle.is_some()
    }

}

impl Drop for StateStorageManager {
    fn drop(&mut self) {
        self.stop_cleanup();
    }
}
