//! In-memory conversation store for tests and ephemeral deployments.

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Conversation, ConversationStore};
use crate::types::{ChatError, Result};

/// Process-local store backed by a hash map. Records do not survive
/// restarts; the semantics otherwise match the durable stores.
#[derive(Default)]
pub struct MemoryConversationStore {
    records: RwLock<FxHashMap<String, Conversation>>,
}

impl MemoryConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True when no conversations are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Ids of all stored conversations, in no particular order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.records.read().keys().cloned().collect()
    }

    /// Remove a conversation, returning whether it existed. Used to
    /// exercise update-after-delete failure paths.
    pub fn remove(&self, id: &str) -> bool {
        self.records.write().remove(id).is_some()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<()> {
        self.records
            .write()
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn update(&self, conversation: &Conversation) -> Result<()> {
        let mut records = self.records.write();
        if !records.contains_key(&conversation.id) {
            return Err(ChatError::Persistence {
                reason: format!("update targeted missing conversation {}", conversation.id),
            });
        }
        records.insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }
}

impl std::fmt::Debug for MemoryConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConversationStore")
            .field("records", &self.records.read().len())
            .finish()
    }
}
