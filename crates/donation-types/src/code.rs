//! Foundation short codes (`vsf`, `cf`, `abc-123`).

const FALLBACK_MAX_LEN: usize = 20;

/// Derive a code from a foundation name: the initials of its words, or the
/// hyphenated name (max 20 chars) when that yields fewer than two characters.
pub fn generate_code(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    let words: Vec<&str> = kept.split_whitespace().collect();

    let initials: String = words.iter().filter_map(|w| w.chars().next()).collect();
    if initials.len() >= 2 {
        return initials;
    }

    let hyphenated = words.join("-");
    let truncated: String = hyphenated.chars().take(FALLBACK_MAX_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
