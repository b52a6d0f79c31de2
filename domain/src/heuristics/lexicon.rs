//! Phrase lists used by the textual heuristics.
//!
//! All entries are lowercase. Matching is case-insensitive and respects word
//! boundaries, see [`contains_phrase`].

/// Sorted; looked up with binary search
pub const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "among", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "either", "else", "even", "ever", "every", "few", "for",
    "from", "further", "given", "had", "has", "have", "having", "her", "here", "hers", "him",
    "his", "how", "into", "its", "itself", "just", "least", "less", "like", "made", "make",
    "many", "may", "might", "more", "most", "much", "must", "need", "not", "now", "off", "once",
    "only", "other", "ought", "our", "ours", "out", "over", "own", "per", "rather", "same",
    "shall", "she", "should", "since", "some", "still", "such", "than", "that", "the", "their",
    "theirs", "them", "then", "there", "these", "they", "this", "those", "through", "thus",
    "too", "under", "until", "upon", "very", "was", "were", "what", "when", "where", "whether",
    "which", "while", "who", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yes", "yet", "you", "your", "yours",
];

/// Generic analytical language; counts as on-topic when question terms are absent
pub const ANALYTICAL_MARKERS: &[&str] = &[
    "recommend",
    "evidence suggests",
    "based on",
    "therefore",
    "in conclusion",
    "the data shows",
    "data indicates",
    "my assessment",
    "i estimate",
    "we estimate",
    "on balance",
    "it follows that",
    "the analysis shows",
    "expected value",
];

pub const CONSENSUS_PHRASES: &[&str] = &[
    "we agree",
    "i agree",
    "agree with",
    "in agreement",
    "consensus reached",
    "common ground",
    "we are aligned",
    "fully aligned",
    "shared view",
    "converging on",
    "broad agreement",
];

/// Talk about the debate instead of the question
pub const META_PHRASES: &[&str] = &[
    "methodology",
    "framework",
    "our approach",
    "the process",
    "debate structure",
    "how we debate",
    "definition of",
    "we need to define",
    "evaluation criteria",
    "the question itself",
    "framing",
    "epistemic",
    "scope of this discussion",
    "meta-level",
    "ground rules",
];

pub const UNCERTAINTY_PHRASES: &[&str] = &[
    "uncertain",
    "unclear",
    "possibly",
    "not sure",
    "it depends",
    "hard to say",
    "speculative",
    "unknown",
    "doubtful",
    "tentative",
    "limited data",
];

pub const CERTAINTY_PHRASES: &[&str] = &[
    "certainly",
    "clearly",
    "definitely",
    "strong evidence",
    "without doubt",
    "undoubtedly",
    "highly likely",
    "conclusively",
    "robust evidence",
    "well established",
];

/// Expressions of agreement inside a resolution transcript
pub const RESOLUTION_AGREEMENT_PHRASES: &[&str] = &[
    "i agree",
    "we agree",
    "you are right",
    "you're right",
    "i concede",
    "fair point",
    "both are valid",
    "both valid",
    "consensus",
];

/// True when `phrase` occurs in `haystack` between word boundaries.
///
/// `haystack` must already be lowercase.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(phrase) {
        let start = from + pos;
        let end = start + phrase.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return true;
        }
        from = start + 1;
        while !haystack.is_char_boundary(from) {
            from += 1;
        }
    }
    false
}

/// Number of distinct phrases from `phrases` present in `text`
pub fn count_phrase_hits<S: AsRef<str>>(text: &str, phrases: &[S]) -> usize {
    let lower = text.to_lowercase();
    phrases
        .iter()
        .filter(|p| contains_phrase(&lower, p.as_ref()))
        .count()
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundaries() {
        assert!(contains_phrase("we agree on cost", "we agree"));
        assert!(!contains_phrase("we agreed on cost", "we agree"));
        assert!(contains_phrase("framework.", "framework"));
        assert!(!contains_phrase("frameworks", "framework"));
    }

    #[test]
    fn test_count_is_case_insensitive_and_distinct() {
        let text = "I AGREE. I agree. Common ground exists.";
        assert_eq!(count_phrase_hits(text, CONSENSUS_PHRASES), 2);
    }

    #[test]
    fn test_stop_words_sorted() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
        assert!(is_stop_word("because"));
        assert!(!is_stop_word("pricing"));
    }
}
