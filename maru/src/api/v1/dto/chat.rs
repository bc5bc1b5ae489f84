//! Chat request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Conversation;

/// Request body for `POST /v1/chat/send/stream`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct ChatMessageRequest {
    /// The traveler's free-text question.
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// Query parameters for `GET /v1/chat/history`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct HistoryQuery {
    /// Maximum number of conversations to return. Clamped to `1..=200`.
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    50
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

/// One history entry, most recent first.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ConversationSummaryDto {
    pub conversation_id: i64,
    pub message: String,
    pub response: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationSummaryDto {
    fn from(conversation: Conversation) -> Self {
        Self {
            conversation_id: conversation.id,
            message: conversation.question,
            response: conversation.response,
            created_at: conversation.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_request_deserializes() {
        let req: ChatMessageRequest =
            serde_json::from_str(r#"{"message": "경복궁 알려줘"}"#).expect("deserialize");
        assert_eq!(req.message, "경복궁 알려줘");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_message_fails_validation() {
        let req: ChatMessageRequest =
            serde_json::from_str(r#"{"message": ""}"#).expect("deserialize");
        assert!(req.validate().is_err());
    }

    #[test]
    fn history_query_defaults_limit() {
        let query: HistoryQuery = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn summary_from_conversation() {
        let conversation = Conversation {
            id: 12,
            user_id: 3,
            question: "q".to_string(),
            response: "r".to_string(),
            created_at: Utc::now(),
        };
        let dto = ConversationSummaryDto::from(conversation);
        assert_eq!(dto.conversation_id, 12);
        assert_eq!(dto.message, "q");

        let json = serde_json::to_value(&dto).expect("serialize");
        assert!(json.get("conversation_id").is_some());
        assert!(json.get("created_at").is_some());
    }
}
