//! The session store interface (spec §4.1).

use async_trait::async_trait;

use crate::error::StorageError;
use crate::message::Message;

/// A mapping from session id to an ordered sequence of persisted messages
/// (User/Assistant only — tool traces are per-request scratch, never
/// persisted; see spec §9 "Open question").
///
/// Implementations must serialize concurrent calls on the *same* session id
/// (reads see a consistent snapshot, writes are atomic) while allowing
/// unrelated session ids to proceed independently. Unknown session ids are
/// never an error — they behave as if freshly created and empty.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// A snapshot (defensive copy) in insertion order. Never fails.
    async fn get_messages(&self, session_id: &str) -> Vec<Message>;

    /// Atomically appends one `User` then one `Assistant` message. Either
    /// both become visible on the next read, or neither does.
    async fn append(
        &self,
        session_id: &str,
        user_msg: Message,
        assistant_text: String,
    ) -> Result<(), StorageError>;

    /// Removes all messages for the session; the id remains addressable.
    async fn clear(&self, session_id: &str) -> Result<(), StorageError>;

    /// Removes the session entirely.
    async fn delete(&self, session_id: &str) -> Result<(), StorageError>;

    async fn list_sessions(&self) -> Vec<String>;

    async fn message_count(&self, session_id: &str) -> usize;
}
