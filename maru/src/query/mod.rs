//! Query understanding: intent classification and deterministic rewriting.

mod classifier;
mod rewrite;

pub use classifier::classify;
pub use rewrite::{expand_variants, normalize};

use unicode_segmentation::UnicodeSegmentation;

/// Words stripped before keyword matching: articles, pronouns, generic
/// request verbs, and their common Korean counterparts.
pub(crate) const STOPWORDS: &[&str] = &[
    "a", "an", "the", "i", "me", "my", "we", "our", "you", "your", "it", "is", "are", "was",
    "do", "does", "can", "could", "would", "should", "please", "tell", "show", "give", "find",
    "know", "about", "to", "in", "at", "of", "for", "on", "with", "some", "any", "what",
    "where", "when", "how", "there", "want", "like", "go", "going", "visit", "좀", "저", "제",
    "나", "내", "우리", "있어", "있나요", "알려줘", "알려주세요", "해줘", "해주세요", "뭐야",
    "어디야", "궁금해",
];

/// Remove stopwords from `text`, preserving the order and casing of the
/// remaining tokens and collapsing the leftover whitespace.
pub(crate) fn strip_stopwords(text: &str) -> String {
    let kept: Vec<&str> = text
        .unicode_words()
        .filter(|word| {
            let lower = word.to_lowercase();
            !STOPWORDS.contains(&lower.as_str())
        })
        .collect();
    kept.join(" ")
}

/// Marker test used by the rule tables. Short ASCII markers are matched on
/// word boundaries so "vs" does not fire inside "tvs"; everything else
/// (phrases, Korean fragments) matches as a substring.
pub(crate) fn contains_marker(text: &str, marker: &str) -> bool {
    let single_ascii_word =
        marker.chars().all(|c| c.is_ascii_alphanumeric()) && !marker.is_empty();
    if single_ascii_word {
        text.unicode_words().any(|word| word.eq_ignore_ascii_case(marker))
    } else {
        text.contains(marker)
    }
}

pub(crate) fn contains_any_marker(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| contains_marker(text, marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_stopwords_keeps_content_words() {
        assert_eq!(
            strip_stopwords("tell me about the gyeongbokgung palace"),
            "gyeongbokgung palace"
        );
    }

    #[test]
    fn strip_stopwords_handles_korean_particles() {
        assert_eq!(strip_stopwords("경복궁 알려줘"), "경복궁");
    }

    #[test]
    fn strip_stopwords_is_idempotent() {
        let once = strip_stopwords("what is the best market in seoul");
        assert_eq!(strip_stopwords(&once), once);
    }

    #[test]
    fn marker_word_boundaries() {
        assert!(contains_marker("a vs b", "vs"));
        assert!(!contains_marker("tvs are cheap", "vs"));
        assert!(contains_marker("which is better for lunch", "which is better"));
        assert!(contains_marker("서울 맛집 추천", "추천"));
    }
}
