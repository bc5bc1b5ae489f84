use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{MaruError, Result};

/// Point identifier as the search service reports it (integer or string).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Str(String),
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// One nearest-neighbor hit.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f32,
    #[serde(default)]
    pub payload: Value,
}

/// One stored record, as returned by a scroll.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredPoint {
    pub id: PointId,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: u32,
    score_threshold: f32,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Serialize)]
struct ScrollRequest {
    limit: u32,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    points: Vec<StoredPoint>,
}

/// REST client for the vector-similarity search service (qdrant wire
/// format). Calls are single-attempt; the retrieval layer treats a failure
/// as a skipped variant or domain.
#[derive(Clone)]
pub struct VectorApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl VectorApiClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MaruError::VectorSearch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref api_key) = self.api_key {
            headers.insert(
                "api-key",
                HeaderValue::from_str(api_key)
                    .map_err(|e| MaruError::VectorSearch(format!("Invalid API key: {e}")))?,
            );
        }
        Ok(headers)
    }

    /// Top-k nearest neighbors above `min_score` in `collection`.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: u32,
        min_score: f32,
    ) -> Result<Vec<ScoredPoint>> {
        let url = format!("{}/collections/{collection}/points/search", self.base_url);
        let request = SearchRequest {
            vector,
            limit,
            score_threshold: min_score,
            with_payload: true,
        };

        let resp = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| MaruError::VectorSearch(format!("Search request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MaruError::VectorSearch(format!(
                "Search on '{collection}' returned {status}: {body}"
            )));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| MaruError::VectorSearch(format!("Failed to parse response: {e}")))?;
        Ok(body.result)
    }

    /// First `limit` stored records of `collection`, payloads only.
    pub async fn scroll(&self, collection: &str, limit: u32) -> Result<Vec<StoredPoint>> {
        let url = format!("{}/collections/{collection}/points/scroll", self.base_url);
        let request = ScrollRequest {
            limit,
            with_payload: true,
        };

        let resp = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| MaruError::VectorSearch(format!("Scroll request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MaruError::VectorSearch(format!(
                "Scroll on '{collection}' returned {status}: {body}"
            )));
        }

        let body: ScrollResponse = resp
            .json()
            .await
            .map_err(|e| MaruError::VectorSearch(format!("Failed to parse response: {e}")))?;
        Ok(body.result.points)
    }
}
