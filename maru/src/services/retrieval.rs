//! Multi-domain retrieval: fan-out similarity search, score fusion, and
//! best-candidate selection.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tokio::task::JoinSet;
use unicode_segmentation::UnicodeSegmentation;

use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::models::{Domain, SearchCandidate, FUSION_THRESHOLD};
use crate::query::normalize;
use crate::vector::VectorSearchProvider;

#[derive(Clone)]
pub struct RetrievalService {
    embeddings: EmbeddingProvider,
    vector: VectorSearchProvider,
}

/// What a full retrieval pass produced.
#[derive(Debug, Default)]
pub struct RetrievalOutcome {
    /// Best candidate per domain, kept only above the fusion threshold.
    pub by_domain: HashMap<Domain, SearchCandidate>,
    /// Overall best across domains; ties go to the higher-priority domain.
    pub best: Option<SearchCandidate>,
}

impl RetrievalService {
    pub fn new(embeddings: EmbeddingProvider, vector: VectorSearchProvider) -> Self {
        Self { embeddings, vector }
    }

    /// Search every applicable domain concurrently (one task per domain) and
    /// fuse the per-domain winners. Individual variant failures are skipped;
    /// the pass as a whole never fails.
    pub async fn retrieve(&self, variants: &[String], domains: &[Domain]) -> RetrievalOutcome {
        let mut tasks = JoinSet::new();
        for &domain in domains {
            let service = self.clone();
            let variants = variants.to_vec();
            tasks.spawn(async move {
                let best = service.best_for_domain(domain, &variants).await;
                (domain, best)
            });
        }

        let mut domain_best = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((domain, Some(candidate))) => domain_best.push((domain, candidate)),
                Ok((domain, None)) => {
                    tracing::debug!(%domain, "no candidate for domain");
                }
                Err(e) => {
                    tracing::error!(error = %e, "domain search task failed");
                }
            }
        }

        fuse(domain_best)
    }

    /// Track the single highest-scoring candidate for one domain across all
    /// variants. A failed embed or search call skips that variant only.
    async fn best_for_domain(
        &self,
        domain: Domain,
        variants: &[String],
    ) -> Option<SearchCandidate> {
        let mut best: Option<SearchCandidate> = None;

        for variant in variants {
            let vector = match self.embeddings.embed_query(variant).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(%domain, variant = %variant, error = %e, "embedding failed, skipping variant");
                    continue;
                }
            };

            let hits = match self.vector.search_domain(domain, &vector).await {
                Ok(h) => h,
                Err(e) => {
                    tracing::warn!(%domain, variant = %variant, error = %e, "search failed, skipping variant");
                    continue;
                }
            };

            let normalized = normalize(variant);
            for hit in hits {
                let title = hit
                    .payload
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let candidate = SearchCandidate {
                    domain,
                    external_id: hit.id.to_string(),
                    keyword_overlap: keyword_overlap(&normalized, &title),
                    title,
                    vector_score: hit.score.clamp(0.0, 1.0),
                    payload: hit.payload,
                };

                let better = best
                    .as_ref()
                    .map_or(true, |b| candidate.combined_score() > b.combined_score());
                if better {
                    best = Some(candidate);
                }
            }
        }

        if let Some(ref candidate) = best {
            tracing::debug!(
                %domain,
                title = %candidate.title,
                score = candidate.combined_score(),
                "best candidate for domain"
            );
        }

        best
    }

    /// First `limit` records of a domain, payloads only. Used by the
    /// random-recommendation path.
    pub async fn sample_payloads(&self, domain: Domain, limit: u32) -> Result<Vec<Value>> {
        let points = self.vector.sample_domain(domain, limit).await?;
        Ok(points
            .into_iter()
            .map(|p| p.payload)
            .filter(|p| !p.is_null())
            .collect())
    }
}

/// Jaccard overlap between the word sets of the normalized query and the
/// candidate title.
pub fn keyword_overlap(normalized_query: &str, title: &str) -> f32 {
    let query_words: HashSet<String> = normalized_query
        .unicode_words()
        .map(str::to_lowercase)
        .collect();
    let title_words: HashSet<String> = title.unicode_words().map(str::to_lowercase).collect();

    if query_words.is_empty() || title_words.is_empty() {
        return 0.0;
    }

    let intersection = query_words.intersection(&title_words).count();
    let union = query_words.union(&title_words).count();
    intersection as f32 / union as f32
}

/// Apply the fusion threshold per domain and pick the overall best, with
/// ties broken by domain priority (festival > attraction > restaurant).
fn fuse(domain_best: Vec<(Domain, SearchCandidate)>) -> RetrievalOutcome {
    let mut by_domain = HashMap::new();

    for (domain, candidate) in domain_best {
        if candidate.combined_score() > FUSION_THRESHOLD {
            by_domain.insert(domain, candidate);
        } else {
            tracing::debug!(
                %domain,
                score = candidate.combined_score(),
                "best candidate below fusion threshold"
            );
        }
    }

    let mut best: Option<SearchCandidate> = None;
    for candidate in by_domain.values() {
        let replace = match &best {
            None => true,
            Some(current) => {
                let score = candidate.combined_score();
                let current_score = current.combined_score();
                score > current_score
                    || (score == current_score
                        && candidate.domain.priority() < current.domain.priority())
            }
        };
        if replace {
            best = Some(candidate.clone());
        }
    }

    RetrievalOutcome { by_domain, best }
}
