use crate::config::VectorConfig;
use crate::error::Result;
use crate::models::Domain;

use super::api::{ScoredPoint, StoredPoint, VectorApiClient};

/// Domain-aware wrapper over the vector search API: maps each domain to its
/// collection and carries the configured top-k and similarity floor.
#[derive(Clone)]
pub struct VectorSearchProvider {
    client: VectorApiClient,
    festival_collection: String,
    attraction_collection: String,
    restaurant_collection: String,
    top_k: u32,
    min_score: f32,
}

impl VectorSearchProvider {
    pub fn new(config: &VectorConfig) -> Result<Self> {
        let client = VectorApiClient::new(
            &config.url,
            config.api_key.as_deref(),
            config.timeout_secs,
        )?;

        Ok(Self {
            client,
            festival_collection: config.festival_collection.clone(),
            attraction_collection: config.attraction_collection.clone(),
            restaurant_collection: config.restaurant_collection.clone(),
            top_k: config.top_k,
            min_score: config.min_score,
        })
    }

    pub fn collection_for(&self, domain: Domain) -> &str {
        match domain {
            Domain::Festival => &self.festival_collection,
            Domain::Attraction => &self.attraction_collection,
            Domain::Restaurant => &self.restaurant_collection,
        }
    }

    pub async fn search_domain(&self, domain: Domain, vector: &[f32]) -> Result<Vec<ScoredPoint>> {
        self.client
            .search(self.collection_for(domain), vector, self.top_k, self.min_score)
            .await
    }

    pub async fn sample_domain(&self, domain: Domain, limit: u32) -> Result<Vec<StoredPoint>> {
        self.client.scroll(self.collection_for(domain), limit).await
    }
}
