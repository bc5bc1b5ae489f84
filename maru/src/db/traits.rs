use async_trait::async_trait;

use crate::error::Result;
use crate::models::Conversation;

/// Append-only conversation log.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert one exchange atomically and return its id.
    async fn append_conversation(
        &self,
        user_id: i64,
        question: &str,
        response: &str,
    ) -> Result<i64>;

    /// Most-recent-first history for a user, bounded by `limit`.
    async fn conversation_history(&self, user_id: i64, limit: u32) -> Result<Vec<Conversation>>;

    /// Cheap liveness probe for health reporting.
    async fn ping(&self) -> Result<()>;
}

/// Validation side of the externally issued session tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve a bearer token to a user id, if the session is still valid.
    async fn verify_session(&self, token: &str) -> Result<Option<i64>>;

    /// Drop expired sessions; returns how many were removed.
    async fn purge_expired_sessions(&self) -> Result<u64>;
}

/// Everything the application needs from the persistence layer.
pub trait DatabaseBackend: ConversationStore + SessionStore {}

impl<T: ConversationStore + SessionStore> DatabaseBackend for T {}
