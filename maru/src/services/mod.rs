mod chat;
pub mod markers;
mod retrieval;

pub use chat::ChatService;
pub use retrieval::{keyword_overlap, RetrievalOutcome, RetrievalService};
