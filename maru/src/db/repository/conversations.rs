use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::{MaruError, Result};
use crate::models::Conversation;

pub struct ConversationRepository;

impl ConversationRepository {
    pub async fn create(
        conn: &Connection,
        user_id: i64,
        question: &str,
        response: &str,
    ) -> Result<i64> {
        conn.execute(
            r#"
            INSERT INTO conversations (user_id, question, response, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                user_id,
                question.to_string(),
                response.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    pub async fn list_recent(
        conn: &Connection,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<Conversation>> {
        let mut rows = conn
            .query(
                r#"
                SELECT convers_id, user_id, question, response, created_at
                FROM conversations
                WHERE user_id = ?1
                ORDER BY created_at DESC, convers_id DESC
                LIMIT ?2
                "#,
                params![user_id, limit],
            )
            .await?;

        let mut conversations = Vec::new();
        while let Some(row) = rows.next().await? {
            conversations.push(Self::row_to_conversation(&row)?);
        }

        Ok(conversations)
    }

    fn row_to_conversation(row: &libsql::Row) -> Result<Conversation> {
        let created_at_raw: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| MaruError::Internal(format!("Invalid created_at timestamp: {e}")))?;

        Ok(Conversation {
            id: row.get(0)?,
            user_id: row.get(1)?,
            question: row.get(2)?,
            response: row.get(3)?,
            created_at,
        })
    }
}
