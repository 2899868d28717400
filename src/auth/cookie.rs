//! Cookie header decoding and the `pb_auth` cookie codec.
//!
//! Parses a semicolon-delimited `name=value` cookie header into a map of
//! decoded values, and round-trips the backend's `pb_auth` authentication
//! cookie (a percent-encoded JSON payload carrying the token and record id).

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Name of the cookie carrying serialized auth state for the backend.
pub const AUTH_COOKIE_NAME: &str = "pb_auth";

/// Decodes a cookie header string into a name → value map.
///
/// `None` (no header present) yields an empty map. Decoding is best-effort
/// and never fails:
///
/// - pairs are scanned left to right; text before a stray `;` that has no
///   `=` of its own is discarded,
/// - names and values are trimmed of surrounding whitespace,
/// - a value starting with `"` has exactly one leading and one trailing
///   character stripped,
/// - values containing `%` are percent-decoded, falling back to the raw
///   value when the escape sequence is malformed,
/// - the first occurrence of a name wins; later duplicates are skipped.
#[must_use]
pub fn parse_cookie_header(header: Option<&str>) -> HashMap<String, String> {
    let Some(raw) = header else {
        return HashMap::new();
    };

    let mut cookies = HashMap::new();
    let mut index = 0;

    while index < raw.len() {
        let Some(eq_idx) = find_from(raw, index, '=') else {
            // No further pairs; the remaining text cannot form one.
            break;
        };
        let sep_idx = find_from(raw, index, ';').unwrap_or(raw.len());

        if sep_idx < eq_idx {
            // The semicolon terminates a previous pair that never got an `=`.
            // Resume directly after the last `;` preceding the `=` we found.
            match raw[..eq_idx].rfind(';') {
                Some(prev) => index = prev + 1,
                // Unreachable: sep_idx < eq_idx guarantees at least one `;`
                // before the `=`.
                None => break,
            }
            continue;
        }

        let name = raw[index..eq_idx].trim();
        if !cookies.contains_key(name) {
            let value = decode_value(raw[eq_idx + 1..sep_idx].trim());
            cookies.insert(name.to_string(), value);
        }

        index = sep_idx + 1;
    }

    cookies
}

/// Finds `needle` in `haystack` at or after `from`, returning an absolute index.
fn find_from(haystack: &str, from: usize, needle: char) -> Option<usize> {
    haystack[from..].find(needle).map(|pos| pos + from)
}

/// Unquotes and percent-decodes a single trimmed cookie value.
fn decode_value(value: &str) -> String {
    let value = unquote(value);
    if !value.contains('%') {
        return value.to_string();
    }
    match urlencoding::decode(value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            debug!("cookie value has a malformed escape sequence; keeping raw value");
            value.to_string()
        }
    }
}

/// Strips exactly one leading and one trailing character when the value
/// starts with a double quote. The trailing character is not checked.
fn unquote(value: &str) -> &str {
    let Some(stripped) = value.strip_prefix('"') else {
        return value;
    };
    match stripped.char_indices().next_back() {
        Some((last, _)) => &stripped[..last],
        None => stripped,
    }
}

/// Auth state recovered from (or destined for) a `pb_auth` cookie.
///
/// The token is sensitive and redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCookiePayload {
    /// The bearer token.
    pub token: String,
    /// Id of the authenticated record; empty when the cookie did not carry one.
    pub record_id: String,
}

impl fmt::Debug for AuthCookiePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCookiePayload")
            .field("token", &"[REDACTED]")
            .field("record_id", &self.record_id)
            .finish()
    }
}

/// Serializes auth state into a `pb_auth` cookie pair.
///
/// The payload is JSON, percent-encoded so the whole pair survives inside a
/// larger cookie header.
#[must_use]
pub fn export_auth_cookie(token: &str, record_id: &str) -> String {
    let payload = serde_json::json!({ "token": token, "record_id": record_id }).to_string();
    format!("{AUTH_COOKIE_NAME}={}", urlencoding::encode(&payload))
}

/// Recovers auth state from a cookie header containing a `pb_auth` cookie.
///
/// Accepts this crate's own export format as well as payloads that nest the
/// record (`{"token": ..., "record": {"id": ...}}`). Returns `None` when the
/// cookie is absent, the payload is not JSON, or the token is missing/empty —
/// a stale or foreign header is not an error.
#[must_use]
pub fn import_auth_cookie(header: &str) -> Option<AuthCookiePayload> {
    let cookies = parse_cookie_header(Some(header));
    let payload = cookies.get(AUTH_COOKIE_NAME)?;
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;

    let token = value.get("token")?.as_str()?;
    if token.is_empty() {
        return None;
    }

    let record_id = value
        .get("record_id")
        .and_then(serde_json::Value::as_str)
        .or_else(|| {
            value
                .get("record")
                .and_then(|record| record.get("id"))
                .and_then(serde_json::Value::as_str)
        })
        .unwrap_or_default();

    Some(AuthCookiePayload {
        token: token.to_string(),
        record_id: record_id.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(header: &str) -> HashMap<String, String> {
        parse_cookie_header(Some(header))
    }

    // ---- Decoder: basics ----

    #[test]
    fn test_parse_absent_header_returns_empty_map() {
        assert!(parse_cookie_header(None).is_empty());
    }

    #[test]
    fn test_parse_empty_header_returns_empty_map() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_two_pairs() {
        let cookies = parse("a=1; b=2");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_parse_first_occurrence_wins() {
        let cookies = parse("a=1; a=2");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["a"], "1");
    }

    #[test]
    fn test_parse_strips_surrounding_quotes() {
        let cookies = parse("a=\"quoted value\"");
        assert_eq!(cookies["a"], "quoted value");
    }

    #[test]
    fn test_parse_percent_decodes_value() {
        let cookies = parse("a=hello%20world");
        assert_eq!(cookies["a"], "hello world");
    }

    #[test]
    fn test_parse_malformed_escape_falls_back_to_raw_value() {
        let cookies = parse("a=100%");
        assert_eq!(cookies["a"], "100%");
    }

    #[test]
    fn test_parse_invalid_utf8_escape_falls_back_to_raw_value() {
        // %FF is a valid hex escape but not valid UTF-8 on its own.
        let cookies = parse("a=%FF");
        assert_eq!(cookies["a"], "%FF");
    }

    #[test]
    fn test_parse_no_equals_returns_empty_map() {
        assert!(parse("nocookieshere").is_empty());
    }

    #[test]
    fn test_parse_is_pure_and_repeatable() {
        let header = "a=1; b=%20; c=\"x\"";
        assert_eq!(parse(header), parse(header));
    }

    // ---- Decoder: structure and whitespace ----

    #[test]
    fn test_parse_trims_names_and_values() {
        let cookies = parse("  a  =  1  ; b=2");
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_parse_value_extends_to_end_without_semicolon() {
        let cookies = parse("session=abc123");
        assert_eq!(cookies["session"], "abc123");
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let cookies = parse("a=b=c; d=e");
        assert_eq!(cookies["a"], "b=c");
        assert_eq!(cookies["d"], "e");
    }

    #[test]
    fn test_parse_skips_unterminated_prefix_pair() {
        // "foo" never gets an `=`; the scan backtracks past its `;` and
        // still picks up the pair that follows.
        let cookies = parse("foo; bar=2");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["bar"], "2");
    }

    #[test]
    fn test_parse_consecutive_semicolons() {
        let cookies = parse("a=1;;b=2");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_parse_many_stray_semicolons_between_pairs() {
        let cookies = parse("junk; more junk;; a=1 ;; ;b=2");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_parse_empty_value() {
        let cookies = parse("a=; b=2");
        assert_eq!(cookies["a"], "");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_parse_lone_quote_value_becomes_empty() {
        let cookies = parse("a=\"");
        assert_eq!(cookies["a"], "");
    }

    #[test]
    fn test_parse_quote_stripping_does_not_validate_closing_quote() {
        // Exactly one leading and one trailing character are removed.
        let cookies = parse("a=\"abc");
        assert_eq!(cookies["a"], "ab");
    }

    #[test]
    fn test_parse_quoted_percent_encoded_value() {
        let cookies = parse("a=\"hello%20world\"");
        assert_eq!(cookies["a"], "hello world");
    }

    #[test]
    fn test_parse_trailing_semicolon() {
        let cookies = parse("a=1;");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["a"], "1");
    }

    #[test]
    fn test_parse_multibyte_values_survive() {
        let cookies = parse("a=\"héllo\"; b=жук");
        assert_eq!(cookies["a"], "héllo");
        assert_eq!(cookies["b"], "жук");
    }

    // ---- pb_auth codec ----

    #[test]
    fn test_auth_cookie_round_trip() {
        let header = export_auth_cookie("tok_abc.123", "rec42");
        let payload = import_auth_cookie(&header).unwrap();
        assert_eq!(payload.token, "tok_abc.123");
        assert_eq!(payload.record_id, "rec42");
    }

    #[test]
    fn test_auth_cookie_round_trip_inside_larger_header() {
        let header = format!("theme=dark; {}; lang=en", export_auth_cookie("tok", "id1"));
        let payload = import_auth_cookie(&header).unwrap();
        assert_eq!(payload.token, "tok");
        assert_eq!(payload.record_id, "id1");
    }

    #[test]
    fn test_import_accepts_nested_record_payload() {
        let payload = serde_json::json!({ "token": "tok", "record": { "id": "r9" } }).to_string();
        let header = format!("{AUTH_COOKIE_NAME}={}", urlencoding::encode(&payload));
        let imported = import_auth_cookie(&header).unwrap();
        assert_eq!(imported.token, "tok");
        assert_eq!(imported.record_id, "r9");
    }

    #[test]
    fn test_import_missing_cookie_returns_none() {
        assert!(import_auth_cookie("theme=dark; lang=en").is_none());
    }

    #[test]
    fn test_import_non_json_payload_returns_none() {
        assert!(import_auth_cookie("pb_auth=not-json").is_none());
    }

    #[test]
    fn test_import_empty_token_returns_none() {
        let payload = serde_json::json!({ "token": "", "record_id": "r" }).to_string();
        let header = format!("{AUTH_COOKIE_NAME}={}", urlencoding::encode(&payload));
        assert!(import_auth_cookie(&header).is_none());
    }

    #[test]
    fn test_auth_cookie_payload_debug_redacts_token() {
        let payload = AuthCookiePayload {
            token: "super_secret_token".to_string(),
            record_id: "r1".to_string(),
        };
        let debug_str = format!("{payload:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("super_secret_token"));
    }
}
