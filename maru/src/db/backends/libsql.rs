use async_trait::async_trait;

use crate::db::connection::Database;
use crate::db::repository::{ConversationRepository, SessionRepository};
use crate::db::traits::{ConversationStore, SessionStore};
use crate::error::Result;
use crate::models::Conversation;

pub struct LibSqlBackend {
    database: Database,
}

impl LibSqlBackend {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl ConversationStore for LibSqlBackend {
    async fn append_conversation(
        &self,
        user_id: i64,
        question: &str,
        response: &str,
    ) -> Result<i64> {
        let conn = self.database.connect()?;
        ConversationRepository::create(&conn, user_id, question, response).await
    }

    async fn conversation_history(&self, user_id: i64, limit: u32) -> Result<Vec<Conversation>> {
        let conn = self.database.connect()?;
        ConversationRepository::list_recent(&conn, user_id, limit).await
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.database.connect()?;
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn verify_session(&self, token: &str) -> Result<Option<i64>> {
        let conn = self.database.connect()?;
        SessionRepository::find_user(&conn, token).await
    }

    async fn purge_expired_sessions(&self) -> Result<u64> {
        let conn = self.database.connect()?;
        SessionRepository::purge_expired(&conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use chrono::{Duration, Utc};
    use libsql::params;

    // Each connection to a ":memory:" database gets its own private store,
    // so backend tests need a file-backed database shared across
    // connections.
    async fn file_backend() -> (LibSqlBackend, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DatabaseConfig {
            url: format!("file:{}", dir.path().join("maru-test.db").display()),
            auth_token: None,
            local_path: None,
        };
        let backend = LibSqlBackend::new(Database::new(&config).await.expect("database"));
        (backend, dir)
    }

    async fn insert_session(backend: &LibSqlBackend, token: &str, user_id: i64, expired: bool) {
        let expires_at = if expired {
            Some((Utc::now() - Duration::hours(1)).to_rfc3339())
        } else {
            Some((Utc::now() + Duration::hours(1)).to_rfc3339())
        };
        let conn = backend.database.connect().expect("connect");
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                token.to_string(),
                user_id,
                Utc::now().to_rfc3339(),
                expires_at
            ],
        )
        .await
        .expect("insert session");
    }

    #[tokio::test]
    async fn append_and_read_history_newest_first() {
        let (backend, _dir) = file_backend().await;

        let first = backend
            .append_conversation(1, "경복궁 어디야?", "경복궁은...")
            .await
            .expect("append");
        let second = backend
            .append_conversation(1, "남산타워는?", "남산타워는...")
            .await
            .expect("append");
        assert!(second > first);

        let history = backend.conversation_history(1, 50).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second);
        assert_eq!(history[1].id, first);
    }

    #[tokio::test]
    async fn history_respects_limit_and_user_isolation() {
        let (backend, _dir) = file_backend().await;

        for i in 0..5 {
            backend
                .append_conversation(1, &format!("q{i}"), "a")
                .await
                .expect("append");
        }
        backend
            .append_conversation(2, "other user", "a")
            .await
            .expect("append");

        let history = backend.conversation_history(1, 3).await.expect("history");
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|c| c.user_id == 1));
    }

    #[tokio::test]
    async fn verify_session_rejects_unknown_and_expired() {
        let (backend, _dir) = file_backend().await;
        insert_session(&backend, "live-token", 7, false).await;
        insert_session(&backend, "dead-token", 8, true).await;

        assert_eq!(
            backend.verify_session("live-token").await.expect("verify"),
            Some(7)
        );
        assert_eq!(
            backend.verify_session("dead-token").await.expect("verify"),
            None
        );
        assert_eq!(
            backend.verify_session("missing").await.expect("verify"),
            None
        );
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let (backend, _dir) = file_backend().await;
        insert_session(&backend, "live-token", 7, false).await;
        insert_session(&backend, "dead-token", 8, true).await;

        let removed = backend.purge_expired_sessions().await.expect("purge");
        assert_eq!(removed, 1);
        assert_eq!(
            backend.verify_session("live-token").await.expect("verify"),
            Some(7)
        );
    }

    #[tokio::test]
    async fn ping_succeeds_on_live_database() {
        let (backend, _dir) = file_backend().await;
        backend.ping().await.expect("ping");
    }
}
