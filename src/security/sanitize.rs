//! Denylist input sanitization.
//!
//! Defense in depth behind the field validators: the validators reject
//! malformed input outright, this transform cleans what was accepted before
//! it is echoed back. A denylist cannot catch every encoding or obfuscation
//! bypass; it is deliberately not relied on as the only XSS defense.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substrings removed outright before encoding. Matched case-insensitively.
const DANGEROUS_SUBSTRINGS: &[&str] = &[
    "<", ">", "\"", "'", "&", "javascript:", "vbscript:", "onload", "onerror",
];

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());

static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bon\w+\s*=").unwrap());

/// Deterministic, idempotent cleaning transform.
///
/// The strip passes run to a fixpoint: removing one token can splice its
/// neighbours into another (`javascrjavascript:ipt:` reconstitutes
/// `javascript:`), so a single pass would leave input a second application
/// could still change. Removal happens before entity encoding, so encoding
/// never reintroduces a character a later pass would strip;
/// `sanitize(sanitize(x)) == sanitize(x)` holds for arbitrary input.
pub fn sanitize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut cleaned = input.to_string();
    loop {
        let mut pass = cleaned.clone();
        for needle in DANGEROUS_SUBSTRINGS {
            pass = remove_case_insensitive(&pass, needle);
        }
        pass = SCRIPT_BLOCK.replace_all(&pass, "").into_owned();
        pass = EVENT_HANDLER.replace_all(&pass, "").into_owned();

        if pass == cleaned {
            break;
        }
        cleaned = pass;
    }

    html_escape(&cleaned).trim().to_string()
}

fn remove_case_insensitive(haystack: &str, needle: &str) -> String {
    let lower_haystack = haystack.to_lowercase();
    let lower_needle = needle.to_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut pos = 0;

    while let Some(found) = lower_haystack[pos..].find(&lower_needle) {
        let start = pos + found;
        out.push_str(&haystack[pos..start]);
        pos = start + needle.len();
    }
    out.push_str(&haystack[pos..]);
    out
}

/// Entity-encode HTML specials. After the removal pass this is a no-op for
/// the denylisted characters; it stays as a second line of defense.
fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_and_schemes() {
        assert_eq!(sanitize("<script>alert(1)</script>"), "scriptalert(1)/script");
        assert_eq!(sanitize("hello JAVASCRIPT:void(0)"), "hello void(0)");
        assert_eq!(sanitize("a & b \"quoted\""), "a  b quoted");
    }

    #[test]
    fn test_removes_event_handlers() {
        let out = sanitize("x ONLOAD=evil y onclick = evil z");
        assert!(!out.to_lowercase().contains("onload"));
        assert!(!out.to_lowercase().contains("onclick ="));
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitize("  plain text  "), "plain text");
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn test_idempotent() {
        let cases = [
            "<script>alert('xss')</script>",
            "O'Brien-Smith",
            "user@example.com",
            "a & b < c > d",
            "javascript:javascript:nested",
            "javascrjavascript:ipt:payload",
            "  spaced  ",
            "plain",
        ];
        for case in cases {
            let once = sanitize(case);
            assert_eq!(sanitize(&once), once, "not idempotent for {case:?}");
        }
    }

    #[test]
    fn test_preserves_benign_text() {
        assert_eq!(sanitize("Jane Doe"), "Jane Doe");
        assert_eq!(sanitize("freshman"), "freshman");
    }
}
