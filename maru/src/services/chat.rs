//! The chat pipeline: classify, retrieve, compose, stream.
//!
//! Every request produces a stream of [`StreamEvent`]s ending in exactly one
//! terminal event (`done` or `error`). Persistence runs in its own phase
//! after generation has finished, so dropping the stream mid-generation
//! (client disconnect) can never leave a partial conversation row behind.

use std::sync::Arc;

use futures::Stream;
use serde_json::Value;

use crate::db::{ConversationStore, DatabaseBackend};
use crate::error::Result;
use crate::llm::prompts::{completion_options, prompt_for};
use crate::llm::LlmProvider;
use crate::models::{
    Conversation, Domain, DonePayload, Intent, MapMarker, SearchCandidate, StreamEvent,
};
use crate::query::{classify, expand_variants};

use super::markers::build_markers;
use super::retrieval::RetrievalService;

/// Upper bound on the random-recommendation sample size.
const MAX_RECOMMENDATIONS: u32 = 20;

#[derive(Clone)]
pub struct ChatService {
    db: Arc<dyn DatabaseBackend>,
    retrieval: RetrievalService,
    llm: LlmProvider,
}

/// Side-channel data accumulated for the terminal `done` event.
#[derive(Debug, Default)]
struct DoneExtras {
    results: Vec<Value>,
    festivals: Vec<Value>,
    attractions: Vec<Value>,
    restaurants: Vec<Value>,
    map_markers: Vec<MapMarker>,
}

impl DoneExtras {
    fn from_candidate(candidate: &SearchCandidate) -> Self {
        let mut extras = Self {
            results: vec![candidate.payload.clone()],
            map_markers: build_markers(&[candidate]),
            ..Self::default()
        };
        extras
            .domain_list_mut(candidate.domain)
            .push(candidate.payload.clone());
        extras
    }

    /// Markers stay empty here: the random path returns titles only.
    fn from_samples(domain: Domain, picks: Vec<Value>) -> Self {
        let mut extras = Self::default();
        *extras.domain_list_mut(domain) = picks;
        extras
    }

    fn domain_list_mut(&mut self, domain: Domain) -> &mut Vec<Value> {
        match domain {
            Domain::Festival => &mut self.festivals,
            Domain::Attraction => &mut self.attractions,
            Domain::Restaurant => &mut self.restaurants,
        }
    }

    fn into_done(self, full_response: String, convers_id: i64) -> DonePayload {
        DonePayload {
            full_response,
            convers_id,
            has_festivals: !self.festivals.is_empty(),
            has_attractions: !self.attractions.is_empty(),
            has_restaurants: !self.restaurants.is_empty(),
            results: self.results,
            festivals: self.festivals,
            attractions: self.attractions,
            restaurants: self.restaurants,
            map_markers: self.map_markers,
        }
    }
}

impl ChatService {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        retrieval: RetrievalService,
        llm: LlmProvider,
    ) -> Self {
        Self { db, retrieval, llm }
    }

    /// Handle one inbound message and stream the reply.
    pub fn stream_reply(
        &self,
        user_id: i64,
        message: String,
    ) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let service = self.clone();

        async_stream::stream! {
            let query = classify(&message);
            tracing::info!(
                intent = ?query.intent,
                keyword = %query.keyword,
                domain_hint = ?query.domain_hint,
                "classified message"
            );

            match query.intent {
                Intent::Comparison | Intent::GeneralAdvice => {
                    let prompt = prompt_for(&query, None, &[]);
                    for await event in service.generate_and_persist(
                        user_id,
                        message.clone(),
                        query.intent,
                        prompt,
                        DoneExtras::default(),
                    ) {
                        yield event;
                    }
                }

                Intent::Recommendation => {
                    let count = query
                        .requested_count
                        .unwrap_or(10)
                        .clamp(1, MAX_RECOMMENDATIONS);
                    let domain = query.domain_hint.unwrap_or(Domain::Attraction);

                    yield StreamEvent::Random {
                        message: format!("Picking {count} {domain} ideas for you..."),
                    };

                    let picks = match service.retrieval.sample_payloads(domain, count).await {
                        Ok(picks) => picks,
                        Err(e) => {
                            tracing::warn!(%domain, error = %e, "sampling failed, recommending without records");
                            Vec::new()
                        }
                    };
                    let titles: Vec<String> = picks
                        .iter()
                        .filter_map(|p| p.get("title").and_then(|v| v.as_str()))
                        .map(str::to_string)
                        .collect();

                    let prompt = prompt_for(&query, None, &titles);
                    for await event in service.generate_and_persist(
                        user_id,
                        message.clone(),
                        query.intent,
                        prompt,
                        DoneExtras::from_samples(domain, picks),
                    ) {
                        yield event;
                    }
                }

                Intent::PlaceSearch => {
                    let domains: Vec<Domain> = match query.domain_hint {
                        Some(domain) => vec![domain],
                        None => Domain::ALL.to_vec(),
                    };

                    let scope = if domains.len() == 1 {
                        "restaurants".to_string()
                    } else {
                        "festivals, attractions and restaurants".to_string()
                    };
                    yield StreamEvent::Searching {
                        message: format!("Searching {scope} for '{}'...", query.keyword),
                    };

                    let variants = expand_variants(&query.keyword);
                    let outcome = service.retrieval.retrieve(&variants, &domains).await;

                    let best = match outcome.best {
                        Some(best) => best,
                        None => {
                            tracing::info!(keyword = %query.keyword, "no candidate above threshold");
                            yield StreamEvent::Error {
                                message: format!(
                                    "I couldn't find a good match for '{}'. Try a different name.",
                                    query.keyword
                                ),
                            };
                            return;
                        }
                    };

                    yield StreamEvent::Found {
                        title: best.title.clone(),
                        result: best.payload.clone(),
                    };

                    let prompt = prompt_for(&query, Some(&best), &[]);
                    for await event in service.generate_and_persist(
                        user_id,
                        message.clone(),
                        query.intent,
                        prompt,
                        DoneExtras::from_candidate(&best),
                    ) {
                        yield event;
                    }
                }
            }
        }
    }

    /// Generation phase followed by the persistence phase. Exactly one
    /// terminal event is yielded; nothing is persisted unless the full
    /// response was generated.
    fn generate_and_persist(
        &self,
        user_id: i64,
        question: String,
        intent: Intent,
        prompt: String,
        extras: DoneExtras,
    ) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let service = self.clone();

        async_stream::stream! {
            yield StreamEvent::Generating {
                message: "Writing your answer...".to_string(),
            };

            let options = completion_options(intent);
            let fragments = match service
                .llm
                .stream_complete(&prompt, None, Some(&options))
                .await
            {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::error!(error = %e, "failed to start generation");
                    yield StreamEvent::Error {
                        message: "The answer could not be generated. Please try again."
                            .to_string(),
                    };
                    return;
                }
            };

            let mut full_response = String::new();
            for await fragment in fragments {
                match fragment {
                    Ok(content) => {
                        full_response.push_str(&content);
                        yield StreamEvent::Chunk { content };
                        // Let the transport flush before the next fragment.
                        tokio::task::yield_now().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "generation failed mid-stream");
                        yield StreamEvent::Error {
                            message: "The answer was interrupted. Please try again.".to_string(),
                        };
                        return;
                    }
                }
            }

            if full_response.trim().is_empty() {
                yield StreamEvent::Error {
                    message: "The model returned an empty answer. Please try again.".to_string(),
                };
                return;
            }

            match service
                .db
                .append_conversation(user_id, &question, &full_response)
                .await
            {
                Ok(convers_id) => {
                    yield StreamEvent::Done(Box::new(extras.into_done(full_response, convers_id)));
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to persist conversation");
                    yield StreamEvent::Error {
                        message: "Your answer was generated but could not be saved to history."
                            .to_string(),
                    };
                }
            }
        }
    }

    pub async fn history(&self, user_id: i64, limit: u32) -> Result<Vec<Conversation>> {
        self.db.conversation_history(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate() -> SearchCandidate {
        SearchCandidate {
            domain: Domain::Attraction,
            external_id: "3".to_string(),
            title: "Namsan Seoul Tower".to_string(),
            vector_score: 0.8,
            keyword_overlap: 0.5,
            payload: json!({
                "title": "Namsan Seoul Tower",
                "latitude": 37.5512,
                "longitude": 126.9882,
                "address": "남산공원길 105"
            }),
        }
    }

    #[test]
    fn extras_from_candidate_fill_matching_domain() {
        let extras = DoneExtras::from_candidate(&candidate());
        assert_eq!(extras.results.len(), 1);
        assert_eq!(extras.attractions.len(), 1);
        assert!(extras.festivals.is_empty());
        assert!(extras.restaurants.is_empty());
        assert_eq!(extras.map_markers.len(), 1);

        let done = extras.into_done("answer".to_string(), 5);
        assert!(done.has_attractions);
        assert!(!done.has_festivals);
        assert_eq!(done.convers_id, 5);
    }

    #[test]
    fn extras_from_samples_have_no_markers() {
        let picks = vec![json!({"title": "A"}), json!({"title": "B"})];
        let extras = DoneExtras::from_samples(Domain::Attraction, picks);
        assert_eq!(extras.attractions.len(), 2);
        assert!(extras.map_markers.is_empty());
        assert!(extras.results.is_empty());
    }
}
