//! SQLite-backed conversation store.
//!
//! Rows keep `chrono::DateTime` out of the stored shape: timestamps are
//! RFC3339 text and the message history is a JSON array, so the schema
//! stays portable and inspectable with plain `sqlite3`.
//!
//! When the `sqlite-migrations` feature is enabled (default), embedded
//! migrations (`sqlx::migrate!("./migrations")`) run on connect; disabling
//! the feature assumes external migration orchestration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::instrument;

use super::{Conversation, ConversationStore};
use crate::message::Message;
use crate::types::{ChatError, Result};

/// Durable conversation store over a shared SQLite pool.
pub struct SqliteConversationStore {
    pool: Arc<SqlitePool>,
}

impl SqliteConversationStore {
    /// Connect (or create) a SQLite database at `database_url`.
    /// Example URL: "sqlite://docchat.db?mode=rwc".
    #[must_use = "store must be used to persist conversations"]
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|err| ChatError::Persistence {
                reason: format!("connect error: {err}"),
            })?;

        #[cfg(feature = "sqlite-migrations")]
        {
            if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
                return Err(ChatError::Persistence {
                    reason: format!("migration failure: {err}"),
                });
            }
        }

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    fn row_to_conversation(row: &SqliteRow) -> Result<Conversation> {
        let id: String = row.try_get("id").map_err(sqlx_error)?;
        let document_url: String = row.try_get("document_url").map_err(sqlx_error)?;
        let messages_json: String = row.try_get("messages_json").map_err(sqlx_error)?;
        let created_at: String = row.try_get("created_at").map_err(sqlx_error)?;
        let updated_at: String = row.try_get("updated_at").map_err(sqlx_error)?;

        let messages: Vec<Message> =
            serde_json::from_str(&messages_json).map_err(|err| ChatError::Persistence {
                reason: format!("malformed messages_json for conversation {id}: {err}"),
            })?;

        Ok(Conversation {
            id,
            document_url,
            messages,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn create(&self, conversation: &Conversation) -> Result<()> {
        let messages_json = encode_messages(&conversation.messages)?;

        sqlx::query(
            r#"
            INSERT INTO conversations (id, document_url, messages_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&conversation.id)
        .bind(&conversation.document_url)
        .bind(&messages_json)
        .bind(conversation.created_at.to_rfc3339())
        .bind(conversation.updated_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let row: Option<SqliteRow> = sqlx::query(
            r#"
            SELECT id, document_url, messages_json, created_at, updated_at
            FROM conversations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(sqlx_error)?;

        row.as_ref().map(Self::row_to_conversation).transpose()
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn update(&self, conversation: &Conversation) -> Result<()> {
        let messages_json = encode_messages(&conversation.messages)?;

        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET document_url = ?2, messages_json = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&conversation.id)
        .bind(&conversation.document_url)
        .bind(&messages_json)
        .bind(conversation.updated_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(ChatError::Persistence {
                reason: format!("update targeted missing conversation {}", conversation.id),
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for SqliteConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConversationStore").finish()
    }
}

fn encode_messages(messages: &[Message]) -> Result<String> {
    serde_json::to_string(messages).map_err(|err| ChatError::Persistence {
        reason: format!("failed to serialize messages: {err}"),
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|err| ChatError::Persistence {
            reason: format!("malformed timestamp {raw:?}: {err}"),
        })
}

fn sqlx_error(err: sqlx::Error) -> ChatError {
    ChatError::Persistence {
        reason: err.to_string(),
    }
}
