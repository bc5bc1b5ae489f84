use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::embeddings::EmbeddingProvider;
use crate::llm::LlmProvider;
use crate::services::{ChatService, RetrievalService};
use crate::vector::VectorSearchProvider;

/// Shared application state. All collaborator clients are constructed once
/// at startup and passed in; nothing is lazily cached at first use.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub embeddings: EmbeddingProvider,
    pub vector: VectorSearchProvider,
    pub llm: LlmProvider,
    pub retrieval: RetrievalService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<dyn DatabaseBackend>,
        embeddings: EmbeddingProvider,
        vector: VectorSearchProvider,
        llm: LlmProvider,
    ) -> Self {
        let config = Arc::new(config);
        let retrieval = RetrievalService::new(embeddings.clone(), vector.clone());
        let chat = ChatService::new(db.clone(), retrieval.clone(), llm.clone());

        Self {
            config,
            db,
            embeddings,
            vector,
            llm,
            retrieval,
            chat,
        }
    }
}
