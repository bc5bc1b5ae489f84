use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::Domain;

/// Weight of the vector similarity score in the fused score.
pub const VECTOR_WEIGHT: f32 = 0.8;
/// Weight of the keyword overlap in the fused score.
pub const KEYWORD_WEIGHT: f32 = 0.2;
/// A domain contributes a fused result only when its best combined score
/// strictly exceeds this threshold.
pub const FUSION_THRESHOLD: f32 = 0.5;

/// What the user is asking for, decided once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Comparison,
    GeneralAdvice,
    Recommendation,
    PlaceSearch,
}

/// Output of the classifier. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedQuery {
    pub intent: Intent,
    pub keyword: String,
    pub requested_count: Option<u32>,
    pub domain_hint: Option<Domain>,
}

/// A scored hit from one (variant, domain) retrieval call.
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub domain: Domain,
    pub external_id: String,
    pub title: String,
    /// Similarity reported by the vector search service, in [0, 1].
    pub vector_score: f32,
    /// Jaccard overlap between query words and title words, in [0, 1].
    pub keyword_overlap: f32,
    pub payload: Value,
}

impl SearchCandidate {
    pub fn combined_score(&self) -> f32 {
        VECTOR_WEIGHT * self.vector_score + KEYWORD_WEIGHT * self.keyword_overlap
    }
}

/// A persisted question/answer exchange. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub question: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only map projection of a fused result with valid coordinates.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MapMarker {
    pub id: String,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub domain: Domain,
    /// Domain-specific extras (address/phone, festival date range).
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, Value>,
}

/// One line of the newline-delimited JSON stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Searching { message: String },
    Random { message: String },
    Found { title: String, result: Value },
    Generating { message: String },
    Chunk { content: String },
    Done(Box<DonePayload>),
    Error { message: String },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Error { .. })
    }
}

/// Payload of the single successful terminal event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DonePayload {
    pub full_response: String,
    pub convers_id: i64,
    pub results: Vec<Value>,
    pub festivals: Vec<Value>,
    pub attractions: Vec<Value>,
    pub restaurants: Vec<Value>,
    pub has_festivals: bool,
    pub has_attractions: bool,
    pub has_restaurants: bool,
    pub map_markers: Vec<MapMarker>,
}
