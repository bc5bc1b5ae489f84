//! Prompt templates for the travel assistant
//!
//! Templates use `format!()` interpolation and are dispatched through an
//! exhaustive match on `(Intent, Domain)`, so adding a new combination is a
//! compile-time-checked addition.

use serde_json::Value;

use crate::llm::provider::CompletionOptions;
use crate::models::{ClassifiedQuery, Domain, Intent, SearchCandidate};

/// Upper bound on the description slot of place prompts.
const DESCRIPTION_MAX_CHARS: usize = 300;

/// Generation parameters are fixed per intent: shorter and more
/// deterministic for comparison and advice, slightly longer for place
/// answers.
pub fn completion_options(intent: Intent) -> CompletionOptions {
    let (max_tokens, temperature) = match intent {
        Intent::Comparison => (400, 0.3),
        Intent::GeneralAdvice => (400, 0.3),
        Intent::Recommendation => (500, 0.7),
        Intent::PlaceSearch => (700, 0.5),
    };
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        top_p: None,
        stop: None,
    }
}

/// Select and fill the template for this request.
pub fn prompt_for(
    query: &ClassifiedQuery,
    result: Option<&SearchCandidate>,
    titles: &[String],
) -> String {
    match (query.intent, result.map(|r| r.domain)) {
        (Intent::Comparison, _) => comparison_prompt(&query.keyword),
        (Intent::GeneralAdvice, _) => match query.domain_hint {
            Some(Domain::Restaurant) => dining_advice_prompt(&query.keyword),
            _ => general_advice_prompt(&query.keyword),
        },
        (Intent::Recommendation, _) => {
            let domain = query.domain_hint.unwrap_or(Domain::Attraction);
            recommendation_prompt(
                &query.keyword,
                query.requested_count.unwrap_or(10),
                domain,
                titles,
            )
        }
        (Intent::PlaceSearch, Some(Domain::Festival)) => {
            festival_prompt(&query.keyword, result.map(|r| &r.payload))
        }
        (Intent::PlaceSearch, Some(Domain::Attraction)) => {
            attraction_prompt(&query.keyword, result.map(|r| &r.payload))
        }
        (Intent::PlaceSearch, Some(Domain::Restaurant)) => {
            restaurant_prompt(&query.keyword, result.map(|r| &r.payload))
        }
        (Intent::PlaceSearch, None) => place_fallback_prompt(&query.keyword),
    }
}

pub fn comparison_prompt(question: &str) -> String {
    format!(
        r#"You are a friendly Korea travel assistant. The traveler wants a comparison.

Question:
{question}

Compare the options the traveler mentioned. Cover atmosphere, best season or
time to go, crowds, and who each option suits best, then give a clear pick.
Keep it under four short paragraphs."#
    )
}

pub fn general_advice_prompt(question: &str) -> String {
    format!(
        r#"You are a friendly Korea travel assistant answering a practical question
about Korean culture, etiquette, or trip planning.

Question:
{question}

Give concrete, practical advice a first-time visitor can act on. Keep it
short and avoid generic filler."#
    )
}

pub fn dining_advice_prompt(question: &str) -> String {
    format!(
        r#"You are a friendly Korea travel assistant answering a question about food
and dining in Korea.

Question:
{question}

Give concrete advice: what to order, how ordering and paying works, and any
dining etiquette worth knowing. Keep it short and practical."#
    )
}

pub fn recommendation_prompt(
    question: &str,
    count: u32,
    domain: Domain,
    titles: &[String],
) -> String {
    let kind = match domain {
        Domain::Festival => "festivals",
        Domain::Attraction => "places to visit",
        Domain::Restaurant => "restaurants",
    };

    if titles.is_empty() {
        return format!(
            r#"You are a friendly Korea travel assistant.

Question:
{question}

Recommend {count} {kind} in Korea. One line per pick with a short reason."#
        );
    }

    let listed = titles
        .iter()
        .map(|title| format!("- {title}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a friendly Korea travel assistant.

Question:
{question}

Pick from this list and present {count} {kind}, one line per pick with a
short reason. Do not invent places that are not on the list.

{listed}"#
    )
}

pub fn festival_prompt(question: &str, payload: Option<&Value>) -> String {
    let title = payload_str(payload, "title");
    let address = payload_str(payload, "address");
    let start_date = payload_str(payload, "start_date");
    let end_date = payload_str(payload, "end_date");
    let description = truncate_chars(&payload_str(payload, "description"), DESCRIPTION_MAX_CHARS);

    format!(
        r#"You are a friendly Korea travel assistant. A traveler asked:
{question}

The best matching festival:
- Name: {title}
- Where: {address}
- When: {start_date} ~ {end_date}
- About: {description}

Describe the festival in a warm, inviting tone: what happens there, when to
go within the date range, and one practical tip for visiting."#
    )
}

pub fn attraction_prompt(question: &str, payload: Option<&Value>) -> String {
    let title = payload_str(payload, "title");
    let address = payload_str(payload, "address");
    let hours = payload_str(payload, "hours");
    let description = truncate_chars(&payload_str(payload, "description"), DESCRIPTION_MAX_CHARS);

    format!(
        r#"You are a friendly Korea travel assistant. A traveler asked:
{question}

The best matching place:
- Name: {title}
- Address: {address}
- Hours: {hours}
- About: {description}

Describe the place, what makes it worth visiting, the best time of day, and
one practical tip (tickets, transport, or nearby food)."#
    )
}

pub fn restaurant_prompt(question: &str, payload: Option<&Value>) -> String {
    let title = payload_str(payload, "title");
    let address = payload_str(payload, "address");
    let menu = payload_str(payload, "menu");
    let hours = payload_str(payload, "hours");

    format!(
        r#"You are a friendly Korea travel assistant. A traveler asked:
{question}

The best matching restaurant:
- Name: {title}
- Address: {address}
- Known for: {menu}
- Hours: {hours}

Describe the restaurant, what to order, and anything useful to know before
going (queues, cash, reservations)."#
    )
}

fn place_fallback_prompt(question: &str) -> String {
    format!(
        r#"You are a friendly Korea travel assistant. A traveler asked:
{question}

Answer from general knowledge of Korean travel destinations. If you are not
sure the place exists, say so instead of guessing."#
    )
}

fn payload_str(payload: Option<&Value>, key: &str) -> String {
    payload
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}…")
}
