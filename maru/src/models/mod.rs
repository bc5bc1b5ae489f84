mod chat;
mod common;

pub use chat::{
    ClassifiedQuery, Conversation, DonePayload, Intent, MapMarker, SearchCandidate, StreamEvent,
    FUSION_THRESHOLD, KEYWORD_WEIGHT, VECTOR_WEIGHT,
};
pub use common::Domain;
