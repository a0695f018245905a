/// Cut `s` after `max_chars` characters and append a marker if anything was
/// dropped.
pub fn truncate_with_marker(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...[truncated]", &s[..cut]),
        None => s.to_string(),
    }
}

/// Truncate a string to a maximum character count, adding "..." if cut.
#[inline]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", truncated)
}
