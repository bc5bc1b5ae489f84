//! Deterministic query normalization and variant expansion.
//!
//! `normalize` is a fixed point: renormalizing its output returns the same
//! string. Alias substitution is skipped whenever the canonical form is
//! already present, which is what keeps the fixed point intact for aliases
//! whose canonical expansion still contains the alias as a substring.

use super::strip_stopwords;

/// Abbreviated or colloquial landmark names mapped to the canonical names
/// the collections are indexed under.
const ALIASES: &[(&str, &str)] = &[
    ("ddp", "dongdaemun design plaza"),
    ("gyeongbok palace", "gyeongbokgung palace"),
    ("n seoul tower", "namsan seoul tower"),
    ("bukchon", "bukchon hanok village"),
    ("han river park", "hangang park"),
];

/// Small bilingual glossary used to widen recall across mixed-language
/// collection titles.
const GLOSSARY: &[(&str, &str)] = &[
    ("palace", "궁궐"),
    ("museum", "박물관"),
    ("market", "시장"),
    ("temple", "사찰"),
    ("festival", "축제"),
];

const LOCALE_QUALIFIERS: &[&str] = &["seoul", "서울", "korea", "한국"];

/// Queries at or below this length get a locale-qualified variant.
const SHORT_QUERY_MAX_CHARS: usize = 12;

/// A request produces at most this many variants.
const MAX_VARIANTS: usize = 4;

/// Lowercase, strip stopwords, then apply the alias table.
pub fn normalize(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let mut normalized = strip_stopwords(&lower);

    for (alias, canonical) in ALIASES {
        if normalized.contains(alias) && !normalized.contains(canonical) {
            tracing::debug!(alias = %alias, canonical = %canonical, "applying alias substitution");
            normalized = normalized.replace(alias, canonical);
        }
    }

    normalized
}

/// Deduplicated, order-preserving union of the original keyword, its
/// normalization, and the expanded rewrites.
pub fn expand_variants(keyword: &str) -> Vec<String> {
    let normalized = normalize(keyword);

    let mut variants: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        let candidate = candidate.trim().to_string();
        if !candidate.is_empty() && !variants.contains(&candidate) && variants.len() < MAX_VARIANTS
        {
            variants.push(candidate);
        }
    };

    push(keyword.trim().to_string());
    push(normalized.clone());

    if !normalized.is_empty()
        && normalized.chars().count() <= SHORT_QUERY_MAX_CHARS
        && !LOCALE_QUALIFIERS.iter().any(|q| normalized.contains(q))
    {
        if normalized.is_ascii() {
            push(format!("{normalized} seoul"));
        } else {
            push(format!("서울 {normalized}"));
        }
    }

    for (en, ko) in GLOSSARY {
        if normalized.contains(en) {
            push(normalized.replace(en, ko));
        } else if normalized.contains(ko) {
            push(normalized.replace(ko, en));
        }
    }

    variants
}
