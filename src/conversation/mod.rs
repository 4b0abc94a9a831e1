//! Conversation state: the persisted record, the store contract, and the
//! manager that resolves and appends turns.
//!
//! The store is a narrow get/create/update seam so the pipeline never
//! depends on a particular persistence engine. Two implementations ship:
//! [`MemoryConversationStore`] for tests and ephemeral deployments, and the
//! sqlx-backed [`SqliteConversationStore`] (behind the default `sqlite`
//! feature) for durable ones.

pub mod store_memory;
#[cfg(feature = "sqlite")]
pub mod store_sqlite;

pub use store_memory::MemoryConversationStore;
#[cfg(feature = "sqlite")]
pub use store_sqlite::SqliteConversationStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::message::Message;
use crate::types::{ChatError, Result};

/// A persisted conversation: an id, the document it is bound to, and the
/// ordered message history.
///
/// Mutated only by appending one user/assistant message pair per completed
/// turn; `updated_at` advances with every append.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub document_url: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a fresh conversation bound to `document_url` with an empty
    /// message history and a generated id.
    #[must_use]
    pub fn new(document_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            document_url: document_url.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Narrow persistence contract for conversation records.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert a new conversation record.
    async fn create(&self, conversation: &Conversation) -> Result<()>;

    /// Load a conversation by id. Absence is `Ok(None)`, not an error;
    /// callers decide whether a missing record is fatal.
    async fn get(&self, id: &str) -> Result<Option<Conversation>>;

    /// Replace the stored record for `conversation.id`.
    ///
    /// Updating an id that no longer exists (e.g. deleted since resolve)
    /// fails with [`ChatError::Persistence`]; callers must not blindly
    /// retry it.
    async fn update(&self, conversation: &Conversation) -> Result<()>;
}

/// Resolves conversations at the start of a request and persists completed
/// turns at the end.
#[derive(Clone)]
pub struct ConversationManager {
    store: Arc<dyn ConversationStore>,
}

impl ConversationManager {
    /// Wrap a store handle. The store is shared process-wide; the manager
    /// itself is cheap to clone.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Load `conversation_id`, or create (and persist) a fresh conversation
    /// bound to `document_url` when no id was supplied.
    ///
    /// A supplied id that does not resolve is [`ChatError::NotFound`]; the
    /// pipeline aborts before any chunking or ranking work.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        conversation_id: Option<&str>,
        document_url: &str,
    ) -> Result<Conversation> {
        match conversation_id {
            Some(id) => self
                .store
                .get(id)
                .await?
                .ok_or_else(|| ChatError::NotFound { id: id.to_string() }),
            None => {
                let conversation = Conversation::new(document_url);
                self.store.create(&conversation).await?;
                Ok(conversation)
            }
        }
    }

    /// Append the completed turn (user question, then assistant answer),
    /// bump `updated_at`, persist the full record, and return the updated
    /// in-memory value.
    ///
    /// This is a read-modify-write: truly concurrent appends against the
    /// same conversation id are not serialized here and can lose a turn.
    /// Callers that need strict ordering serialize requests per id.
    #[instrument(skip_all, fields(conversation_id = %conversation.id))]
    pub async fn append_turn(
        &self,
        mut conversation: Conversation,
        question: &str,
        answer: &str,
    ) -> Result<Conversation> {
        conversation.messages.push(Message::user(question));
        conversation.messages.push(Message::assistant(answer));
        conversation.updated_at = Utc::now();
        self.store.update(&conversation).await?;
        Ok(conversation)
    }
}

impl std::fmt::Debug for ConversationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationManager").finish()
    }
}
