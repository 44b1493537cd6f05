use std::sync::LazyLock;

use regex::Regex;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9 ]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D+").unwrap());

/// Minimum length for an address token to count as evidence
pub const MIN_ADDRESS_TOKEN_LEN: usize = 4;

/// Lowercase, replace non-alphanumeric runs with spaces, collapse whitespace
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_ALNUM.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Keep only the digits
pub fn digits_only(text: &str) -> String {
    NON_DIGIT.replace_all(text, "").into_owned()
}

/// Normalized address tokens long enough to be distinctive
pub fn address_tokens(address: &str) -> Vec<String> {
    normalize_text(address)
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_ADDRESS_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Acme Roofing, LLC.  "), "acme roofing llc");
        assert_eq!(normalize_text("Bob's\tA/C &  Heat"), "bob s a c heat");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("(512) 555-0100"), "5125550100");
        assert_eq!(digits_only("no digits"), "");
    }

    #[test]
    fn test_address_tokens_drop_short_words() {
        assert_eq!(
            address_tokens("123 Main St, Austin TX"),
            vec!["main".to_string(), "austin".to_string()]
        );
    }
}
