use chrono::Utc;
use libsql::{params, Connection};

use crate::error::Result;

pub struct SessionRepository;

impl SessionRepository {
    pub async fn find_user(conn: &Connection, token: &str) -> Result<Option<i64>> {
        let mut rows = conn
            .query(
                r#"
                SELECT user_id FROM sessions
                WHERE token = ?1 AND (expires_at IS NULL OR expires_at > ?2)
                "#,
                params![token.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub async fn purge_expired(conn: &Connection) -> Result<u64> {
        let removed = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![Utc::now().to_rfc3339()],
            )
            .await?;

        Ok(removed)
    }
}
