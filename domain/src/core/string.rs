//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Collapse all runs of whitespace into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line excerpt of `s`, at most `max_len` bytes plus ellipsis.
pub fn excerpt(s: &str, max_len: usize) -> String {
    truncate(&collapse_whitespace(s), max_len)
}

/// Lowercased, whitespace-collapsed prefix used to compare turn texts.
pub fn fingerprint(s: &str, max_len: usize) -> String {
    let collapsed = collapse_whitespace(&s.to_lowercase());
    let mut end = max_len.min(collapsed.len());
    while end > 0 && !collapsed.is_char_boundary(end) {
        end -= 1;
    }
    collapsed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'の' is 3 bytes; target of 4 backs up to the boundary at 3
        assert_eq!(truncate("あのねあのね", 7), "あ...");
    }

    #[test]
    fn test_excerpt_collapses_lines() {
        assert_eq!(excerpt("line one\n\n  line two", 100), "line one line two");
    }

    #[test]
    fn test_fingerprint_ignores_case_and_spacing() {
        assert_eq!(
            fingerprint("We  AGREE\non this", 100),
            fingerprint("we agree on   this", 100)
        );
        assert_eq!(fingerprint("abcdef", 3), "abc");
    }
}
