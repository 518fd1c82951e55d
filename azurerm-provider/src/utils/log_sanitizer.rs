//! Log sanitization utilities
//!
//! ARM responses can carry large payloads (record sets, subscription lists) and
//! request logs must never contain bearer tokens or client secrets.

/// Maximum number of bytes of a response body included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters kept visible by [`mask_secret`].
const VISIBLE_PREFIX: usize = 4;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Truncate a response body for logging.
///
/// Bodies within the limit are returned as-is; longer ones are cut on a char
/// boundary and suffixed with the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }
    format!(
        "{}... [truncated, total {} bytes]",
        &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
        s.len()
    )
}

/// Mask a secret (token, client secret) for `Debug` output and logs.
///
/// Short secrets are masked completely.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= VISIBLE_PREFIX * 2 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE_PREFIX).collect();
    format!("{prefix}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_unchanged() {
        let s = r#"{"error":{"code":"ResourceNotFound"}}"#;
        assert_eq!(truncate_for_log(s), s);
    }

    #[test]
    fn exactly_at_limit() {
        let s = "a".repeat(TRUNCATE_LIMIT);
        assert_eq!(truncate_for_log(&s), s);
    }

    #[test]
    fn over_limit_truncated() {
        let s = "a".repeat(TRUNCATE_LIMIT + 100);
        let result = truncate_for_log(&s);
        assert!(result.starts_with(&"a".repeat(TRUNCATE_LIMIT)));
        assert!(result.ends_with(&format!("total {} bytes]", TRUNCATE_LIMIT + 100)));
    }

    #[test]
    fn multibyte_chars_not_split() {
        let s = "区".repeat(200);
        let result = truncate_for_log(&s);
        assert!(result.contains("... [truncated, total 600 bytes]"));
    }

    #[test]
    fn mask_keeps_prefix_of_long_secret() {
        assert_eq!(mask_secret("eyJ0eXAiOiJKV1Qi"), "eyJ0****");
    }

    #[test]
    fn mask_hides_short_secret() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
