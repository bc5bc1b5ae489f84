use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};

use crate::config::{parse_provider_model, EmbeddingsConfig};
use crate::error::{MaruError, Result};

use super::api::{default_base_url, ApiConfig, EmbeddingApiClient};

enum EmbeddingBackend {
    Local {
        model: Arc<Mutex<TextEmbedding>>,
    },
    Api {
        client: EmbeddingApiClient,
    },
}

/// Turns query text into a fixed-size vector, either with a local fastembed
/// model or an OpenAI-compatible embedding API.
pub struct EmbeddingProvider {
    backend: EmbeddingBackend,
    dimensions: usize,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let (provider, model_name) = parse_provider_model(&config.model);

        if provider == "local" {
            Self::new_local(config, model_name)
        } else {
            Self::new_api(config, provider, model_name)
        }
    }

    fn new_local(config: &EmbeddingsConfig, model_name: &str) -> Result<Self> {
        let embedding_model = resolve_embedding_model(model_name);
        let model = Arc::new(Mutex::new(build_model(embedding_model)?));

        Ok(Self {
            backend: EmbeddingBackend::Local { model },
            dimensions: config.dimensions,
        })
    }

    fn new_api(config: &EmbeddingsConfig, provider: &str, model_name: &str) -> Result<Self> {
        let client = EmbeddingApiClient::new(ApiConfig {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url(provider).to_string()),
            api_key: config.api_key.clone(),
            model: model_name.to_string(),
            timeout_secs: config.timeout_secs,
        })?;

        Ok(Self {
            backend: EmbeddingBackend::Api { client },
            dimensions: config.dimensions,
        })
    }

    async fn embed_single(&self, text: String) -> Result<Vec<f32>> {
        match &self.backend {
            EmbeddingBackend::Local { model } => {
                let model = Arc::clone(model);
                let embeddings = tokio::task::spawn_blocking(move || {
                    let mut model = model.lock().map_err(|e| {
                        MaruError::Embedding(format!("Embedding model lock poisoned: {e}"))
                    })?;
                    model
                        .embed(vec![text], None)
                        .map_err(|e| MaruError::Embedding(e.to_string()))
                })
                .await
                .map_err(|e| MaruError::Embedding(format!("Embedding worker failed: {e}")))??;

                embeddings
                    .into_iter()
                    .next()
                    .ok_or_else(|| MaruError::Embedding("No embedding generated".to_string()))
            }
            EmbeddingBackend::Api { client } => {
                let embeddings = client.embed(&[text.as_str()]).await?;
                embeddings
                    .into_iter()
                    .next()
                    .ok_or_else(|| MaruError::Embedding("No embedding returned".to_string()))
            }
        }
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        match &self.backend {
            EmbeddingBackend::Local { .. } => {
                // Local models use a query: prefix
                self.embed_single(format!("query: {query}")).await
            }
            EmbeddingBackend::Api { .. } => self.embed_single(query.to_string()).await,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Clone for EmbeddingProvider {
    fn clone(&self) -> Self {
        let backend = match &self.backend {
            EmbeddingBackend::Local { model } => EmbeddingBackend::Local {
                model: Arc::clone(model),
            },
            EmbeddingBackend::Api { client } => EmbeddingBackend::Api {
                client: client.clone(),
            },
        };
        Self {
            backend,
            dimensions: self.dimensions,
        }
    }
}

fn resolve_embedding_model(model_name: &str) -> EmbeddingModel {
    match model_name {
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "BAAI/bge-large-en-v1.5" | "bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            EmbeddingModel::AllMiniLML6V2
        }
        "all-MiniLM-L12-v2" | "sentence-transformers/all-MiniLM-L12-v2" => {
            EmbeddingModel::AllMiniLML12V2
        }
        "nomic-embed-text-v1" | "nomic-ai/nomic-embed-text-v1" => EmbeddingModel::NomicEmbedTextV1,
        "nomic-embed-text-v1.5" | "nomic-ai/nomic-embed-text-v1.5" => {
            EmbeddingModel::NomicEmbedTextV15
        }
        _ => EmbeddingModel::BGESmallENV15,
    }
}

fn build_model(embedding_model: EmbeddingModel) -> Result<TextEmbedding> {
    TextEmbedding::try_new(InitOptions::new(embedding_model).with_show_download_progress(true))
        .map_err(|e| MaruError::Embedding(e.to_string()))
}
