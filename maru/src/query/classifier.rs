//! Intent classification.
//!
//! The decision order of the rule table is part of the contract: the first
//! matching rule wins, and ambiguous input always falls through to
//! [`Intent::PlaceSearch`]. Classification never fails.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{ClassifiedQuery, Domain, Intent};

use super::{contains_any_marker, strip_stopwords};

const COMPARISON_MARKERS: &[&str] = &[
    "vs",
    "versus",
    "which is better",
    "which one",
    "compare",
    "비교",
];

const ADVICE_MARKERS: &[&str] = &[
    "advice",
    "tip",
    "tips",
    "etiquette",
    "custom",
    "customs",
    "culture",
    "manners",
    "팁",
    "예절",
    "문화",
    "주의할",
];

/// Concrete place-name markers. Their presence turns an advice-looking
/// question into a place search ("tips for visiting Gyeongbokgung palace"
/// is about the palace, not about culture in general).
const PLACE_MARKERS: &[&str] = &[
    "palace",
    "tower",
    "market",
    "temple",
    "village",
    "park",
    "museum",
    "hanok",
    "궁",
    "타워",
    "시장",
    "사찰",
    "마을",
    "공원",
    "박물관",
    "한옥",
];

const RECOMMENDATION_MARKERS: &[&str] = &["recommend", "suggest", "추천", "가볼만한", "명소"];

const FOOD_MARKERS: &[&str] = &[
    "restaurant",
    "food",
    "eat",
    "eating",
    "dining",
    "dinner",
    "lunch",
    "맛집",
    "음식",
    "식당",
    "먹거리",
    "먹을",
];

/// Default number of picks for a recommendation without an explicit count.
const DEFAULT_RECOMMENDATION_COUNT: u32 = 10;

fn count_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d{1,2})\s*(places|place|spots|spot|개|곳|가지)")
            .expect("count pattern is valid")
    })
}

/// Extract an explicit "N places/spots/개/곳/가지" count, if present.
fn extract_count(text: &str) -> Option<u32> {
    count_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|n| *n > 0)
}

/// Signals precomputed once and consulted by every rule.
struct Signals<'a> {
    lower: &'a str,
    requested_count: Option<u32>,
}

/// Ordered rule table. Precedence is positional; the fallback to
/// `PlaceSearch` lives in [`classify`], not here.
const RULES: &[(Intent, fn(&Signals) -> bool)] = &[
    (Intent::Comparison, |s| {
        contains_any_marker(s.lower, COMPARISON_MARKERS)
    }),
    (Intent::GeneralAdvice, |s| {
        contains_any_marker(s.lower, ADVICE_MARKERS) && !contains_any_marker(s.lower, PLACE_MARKERS)
    }),
    (Intent::Recommendation, |s| {
        contains_any_marker(s.lower, RECOMMENDATION_MARKERS) || s.requested_count.is_some()
    }),
];

/// Map raw message text to an intent plus extracted parameters.
pub fn classify(text: &str) -> ClassifiedQuery {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();

    let requested_count = extract_count(&lower);
    let domain_hint = contains_any_marker(&lower, FOOD_MARKERS).then_some(Domain::Restaurant);

    let signals = Signals {
        lower: &lower,
        requested_count,
    };

    for (intent, applies) in RULES {
        if applies(&signals) {
            let requested_count = match intent {
                Intent::Recommendation => {
                    Some(requested_count.unwrap_or(DEFAULT_RECOMMENDATION_COUNT))
                }
                _ => requested_count,
            };
            return ClassifiedQuery {
                intent: *intent,
                keyword: trimmed.to_string(),
                requested_count,
                domain_hint,
            };
        }
    }

    // Fallback: treat the message as a place search over its content words.
    let cleaned = strip_stopwords(trimmed);
    let keyword = if cleaned.chars().count() < 2 {
        trimmed.to_string()
    } else {
        cleaned
    };

    ClassifiedQuery {
        intent: Intent::PlaceSearch,
        keyword,
        requested_count,
        domain_hint,
    }
}
