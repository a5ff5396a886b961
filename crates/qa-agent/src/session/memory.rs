//! In-process session store backed by a concurrent map.
//!
//! Grounded in the teacher's habit of guarding per-entity state behind a
//! [`dashmap::DashMap`] for cross-session concurrency and an inner
//! `tokio::sync::Mutex` for same-session serialization (mirrors
//! `AgentSystem::running_agents` in the teacher crate). A database-backed
//! implementation satisfying the same trait would replace the inner mutex
//! with a single transactional upsert per `append` (spec §4.1, §9).

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::message::Message;
use crate::session::store::SessionStore;

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Mutex<Vec<Message>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_messages(&self, session_id: &str) -> Vec<Message> {
        match self.sessions.get(session_id) {
            Some(entry) => entry.value().lock().await.clone(),
            None => Vec::new(),
        }
    }

    async fn append(
        &self,
        session_id: &str,
        user_msg: Message,
        assistant_text: String,
    ) -> Result<(), StorageError> {
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Mutex::new(Vec::new()));
        let mut messages = entry.value().lock().await;
        messages.push(user_msg);
        messages.push(Message::assistant_text(assistant_text));
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), StorageError> {
        if let Some(entry) = self.sessions.get(session_id) {
            entry.value().lock().await.clear();
        }
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), StorageError> {
        self.sessions.remove(session_id);
        Ok(())
    }

    async fn list_sessions(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    async fn message_count(&self, session_id: &str) -> usize {
        match self.sessions.get(session_id) {
            Some(entry) => entry.value().lock().await.len(),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_session_reads_as_empty() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get_messages("ghost").await.len(), 0);
        assert_eq!(store.message_count("ghost").await, 0);
    }

    #[tokio::test]
    async fn append_is_atomic_and_ordered() {
        let store = InMemorySessionStore::new();
        store
            .append("s1", Message::user("hi"), "hello".into())
            .await
            .unwrap();
        let messages = store.get_messages("s1").await;
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], Message::User { .. }));
        assert!(matches!(messages[1], Message::Assistant { .. }));
    }

    #[tokio::test]
    async fn clear_keeps_session_addressable() {
        let store = InMemorySessionStore::new();
        store
            .append("s1", Message::user("hi"), "hello".into())
            .await
            .unwrap();
        store.clear("s1").await.unwrap();
        assert_eq!(store.get_messages("s1").await.len(), 0);
        assert!(store.list_sessions().await.contains(&"s1".to_string()));
    }

    #[tokio::test]
    async fn delete_removes_the_session_entirely() {
        let store = InMemorySessionStore::new();
        store
            .append("s1", Message::user("hi"), "hello".into())
            .await
            .unwrap();
        store.delete("s1").await.unwrap();
        assert!(!store.list_sessions().await.contains(&"s1".to_string()));
    }

    #[tokio::test]
    async fn snapshot_is_stable_across_repeated_reads() {
        let store = InMemorySessionStore::new();
        store
            .append("s1", Message::user("hi"), "hello".into())
            .await
            .unwrap();
        let a = store.get_messages("s1").await;
        let b = store.get_messages("s1").await;
        assert_eq!(a.len(), b.len());
    }

    #[tokio::test]
    async fn concurrent_appends_to_different_sessions_dont_contend() {
        let store = std::sync::Arc::new(InMemorySessionStore::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(&format!("s{i}"), Message::user("hi"), "hello".into())
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.list_sessions().await.len(), 20);
    }
}
