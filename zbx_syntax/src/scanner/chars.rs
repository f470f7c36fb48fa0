//! Lexical character classes
//!
//! All classes are ASCII-only. Any other character, including every non-ASCII
//! character, stops the scanner that asks.

/// Host names: alphanumerics, `.`, space, `_` and `-`
pub fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ' ' | '_' | '-')
}

/// Item keys: alphanumerics, `.`, `_` and `-`
pub fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Trigger function names: lowercase ASCII letters
pub fn is_function_char(c: char) -> bool {
    c.is_ascii_lowercase()
}

/// Table and field names in `db` rules
pub fn is_rule_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_chars() {
        for c in ['a', 'Z', '0', '.', ' ', '_', '-'] {
            assert!(is_host_char(c), "{:?} should be a host char", c);
        }
        for c in [':', '{', '}', '[', '(', '"', 'é', '\t'] {
            assert!(!is_host_char(c), "{:?} should not be a host char", c);
        }
    }

    #[test]
    fn test_key_chars_exclude_space() {
        assert!(is_key_char('k'));
        assert!(is_key_char('.'));
        assert!(is_key_char('-'));
        assert!(!is_key_char(' '));
        assert!(!is_key_char('['));
        assert!(!is_key_char('('));
    }

    #[test]
    fn test_function_chars_are_lowercase_only() {
        assert!(is_function_char('l'));
        assert!(!is_function_char('L'));
        assert!(!is_function_char('1'));
        assert!(!is_function_char('_'));
    }

    #[test]
    fn test_rule_identifier_chars() {
        assert!(is_rule_identifier_char('h'));
        assert!(is_rule_identifier_char('_'));
        assert!(is_rule_identifier_char('9'));
        assert!(!is_rule_identifier_char('.'));
        assert!(!is_rule_identifier_char('-'));
    }
}
