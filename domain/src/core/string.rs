//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length, appending an ellipsis.
///
/// The cut always lands on a UTF-8 character boundary.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_input_untouched() {
        assert_eq!(truncate("research", 20), "research");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("objective summary", 10), "objecti...");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // "é" is two bytes; a cut inside it must move back
        assert_eq!(truncate("ééééé", 6), "é...");
    }
}
