/// Truncates `value` to at most `max_chars` characters (not bytes).
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        let value = "é".repeat(10);
        let truncated = truncate_chars(&value, 4);
        assert_eq!(truncated.chars().count(), 4);
        assert_eq!(truncated, "éééé");
    }
}
