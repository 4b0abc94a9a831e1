//! Conversation manager and store contract tests.

use std::sync::Arc;
use std::time::Duration;

use docchat::conversation::{ConversationManager, ConversationStore, MemoryConversationStore};
use docchat::message::Message;
use docchat::types::ChatError;

const DOC: &str = "https://example.com/handbook";

fn manager() -> (ConversationManager, Arc<MemoryConversationStore>) {
    let store = Arc::new(MemoryConversationStore::new());
    (ConversationManager::new(store.clone()), store)
}

#[tokio::test]
async fn resolve_without_id_creates_and_persists_fresh_conversation() {
    let (manager, store) = manager();

    let conversation = manager.resolve(None, DOC).await.unwrap();
    assert!(conversation.messages.is_empty());
    assert_eq!(conversation.document_url, DOC);
    assert_eq!(store.len(), 1);

    // The persisted record matches the returned value.
    let stored = store.get(&conversation.id).await.unwrap().unwrap();
    assert_eq!(stored, conversation);
}

#[tokio::test]
async fn resolve_with_known_id_loads_existing_conversation() {
    let (manager, _store) = manager();

    let created = manager.resolve(None, DOC).await.unwrap();
    let loaded = manager.resolve(Some(&created.id), DOC).await.unwrap();
    assert_eq!(loaded, created);
}

#[tokio::test]
async fn resolve_with_unknown_id_fails_not_found() {
    let (manager, store) = manager();

    let err = manager.resolve(Some("missing-id"), DOC).await.unwrap_err();
    assert!(matches!(err, ChatError::NotFound { .. }));
    assert!(err.is_client_error());
    assert!(store.is_empty());
}

#[tokio::test]
async fn append_turn_adds_user_then_assistant_and_bumps_updated_at() {
    let (manager, store) = manager();
    let conversation = manager.resolve(None, DOC).await.unwrap();
    let created_at = conversation.created_at;

    tokio::time::sleep(Duration::from_millis(5)).await;
    let updated = manager
        .append_turn(conversation, "What is X?", "X is the thing.")
        .await
        .unwrap();

    assert_eq!(updated.messages.len(), 2);
    assert_eq!(updated.messages[0].role, Message::USER);
    assert_eq!(updated.messages[0].content, "What is X?");
    assert_eq!(updated.messages[1].role, Message::ASSISTANT);
    assert_eq!(updated.messages[1].content, "X is the thing.");
    assert!(updated.updated_at > created_at);

    let stored = store.get(&updated.id).await.unwrap().unwrap();
    assert_eq!(stored.messages.len(), 2);
}

#[tokio::test]
async fn each_turn_grows_history_by_exactly_two() {
    let (manager, _store) = manager();
    let mut conversation = manager.resolve(None, DOC).await.unwrap();

    for turn in 1..=3 {
        conversation = manager
            .append_turn(conversation, "question", "answer")
            .await
            .unwrap();
        assert_eq!(conversation.messages.len(), turn * 2);
    }
}

#[tokio::test]
async fn append_to_deleted_conversation_is_a_persistence_error() {
    let (manager, store) = manager();
    let conversation = manager.resolve(None, DOC).await.unwrap();

    assert!(store.remove(&conversation.id));
    let err = manager
        .append_turn(conversation, "question", "answer")
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Persistence { .. }));
}

#[cfg(feature = "sqlite")]
mod sqlite_store {
    use super::*;
    use docchat::conversation::{Conversation, SqliteConversationStore};

    async fn temp_store() -> (SqliteConversationStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("conversations.db").display()
        );
        let store = SqliteConversationStore::connect(&url).await.expect("connect");
        (store, dir)
    }

    #[tokio::test]
    async fn create_then_get_round_trips_messages_and_timestamps() {
        let (store, _dir) = temp_store().await;

        let mut conversation = Conversation::new(DOC);
        conversation.messages.push(Message::user("hello"));
        conversation.messages.push(Message::assistant("hi"));
        store.create(&conversation).await.unwrap();

        let loaded = store.get(&conversation.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, conversation.id);
        assert_eq!(loaded.document_url, DOC);
        assert_eq!(loaded.messages, conversation.messages);
        assert_eq!(loaded.created_at, conversation.created_at);
    }

    #[tokio::test]
    async fn get_of_unknown_id_is_none() {
        let (store, _dir) = temp_store().await;
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_record_and_missing_id_fails() {
        let (store, _dir) = temp_store().await;

        let mut conversation = Conversation::new(DOC);
        store.create(&conversation).await.unwrap();

        conversation.messages.push(Message::user("follow-up"));
        conversation.updated_at = chrono::Utc::now();
        store.update(&conversation).await.unwrap();

        let loaded = store.get(&conversation.id).await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 1);

        let orphan = Conversation::new(DOC);
        let err = store.update(&orphan).await.unwrap_err();
        assert!(matches!(err, ChatError::Persistence { .. }));
    }

    #[tokio::test]
    async fn manager_runs_against_the_sqlite_store() {
        let (store, _dir) = temp_store().await;
        let manager = ConversationManager::new(Arc::new(store));

        let conversation = manager.resolve(None, DOC).await.unwrap();
        let updated = manager
            .append_turn(conversation, "durable?", "yes")
            .await
            .unwrap();
        assert_eq!(updated.messages.len(), 2);

        let reloaded = manager.resolve(Some(&updated.id), DOC).await.unwrap();
        assert_eq!(reloaded.messages.len(), 2);
    }
}
