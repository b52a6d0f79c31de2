//! Key-term extraction and matching.

use super::lexicon::is_stop_word;
use std::collections::HashSet;

const MIN_TERM_LEN: usize = 4;
const STEM_LEN: usize = 6;

/// Lowercase alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Significant terms of `text`: stop words, short tokens and bare numbers
/// dropped, first occurrence order kept.
pub fn extract_key_terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !is_stop_word(t))
        .filter(|t| seen.insert(stem(t).to_string()))
        .collect()
}

/// Crude prefix stem so that "migrate" and "migration" match
pub fn stem(word: &str) -> &str {
    match word.char_indices().nth(STEM_LEN) {
        Some((idx, _)) => &word[..idx],
        None => word,
    }
}

/// Number of distinct `terms` that occur in `text`
pub fn term_hits<S: AsRef<str>>(text: &str, terms: &[S]) -> usize {
    let stems: HashSet<String> = tokenize(text)
        .iter()
        .map(|t| stem(t).to_string())
        .collect();
    terms
        .iter()
        .filter(|t| stems.contains(stem(&t.as_ref().to_lowercase())))
        .count()
}

/// Fraction of `terms` that occur in `text`; 0.0 for no terms
pub fn relevance<S: AsRef<str>>(text: &str, terms: &[S]) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    term_hits(text, terms) as f64 / terms.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_key_terms() {
        let terms = extract_key_terms("Should we migrate the billing database to Postgres in 2025?");
        assert_eq!(terms, vec!["migrate", "billing", "database", "postgres"]);
    }

    #[test]
    fn test_extract_dedups_by_stem() {
        let terms = extract_key_terms("Migration plan: migrate now, migrations later");
        assert_eq!(terms, vec!["migration", "plan", "later"]);
    }

    #[test]
    fn test_term_hits_use_stems() {
        let terms = extract_key_terms("migrate billing database");
        assert_eq!(term_hits("The migration of databases is risky", &terms), 2);
        assert_eq!(term_hits("Lunch options downtown", &terms), 0);
    }

    #[test]
    fn test_relevance() {
        let terms = vec!["pricing".to_string(), "churn".to_string()];
        assert_eq!(relevance("pricing drives churn", &terms), 1.0);
        assert_eq!(relevance("pricing only", &terms), 0.5);
        assert_eq!(relevance("anything", &Vec::<String>::new()), 0.0);
    }

    #[test]
    fn test_stem_is_char_safe() {
        assert_eq!(stem("größenordnung"), "größen");
        assert_eq!(stem("cost"), "cost");
    }
}
