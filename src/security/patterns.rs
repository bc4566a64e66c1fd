//! Suspicious-content signatures and field validators.
//!
//! # Responsibilities
//! - Scan arbitrary text against a fixed attack-signature library
//! - Validate email and name fields for the join form
//!
//! # Design Decisions
//! - Signatures are compiled once into statics; checks are pure functions
//! - First match wins; no scoring or weighting
//! - Case-insensitive throughout (`(?i)` on every pattern)

use once_cell::sync::Lazy;
use regex::Regex;

/// Attack signatures checked against request text and form fields.
///
/// Covers XSS, SQL injection, command injection, path traversal, file
/// inclusion, LDAP and NoSQL injection markers.
static SUSPICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // XSS
        Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap(),
        Regex::new(r"(?i)<script").unwrap(),
        Regex::new(r"(?i)javascript:").unwrap(),
        Regex::new(r"(?i)vbscript:").unwrap(),
        Regex::new(r"(?i)data:text/html").unwrap(),
        Regex::new(r"(?i)\bon\w+\s*=").unwrap(),
        Regex::new(r"(?i)<iframe[^>]*>").unwrap(),
        Regex::new(r"(?i)<object[^>]*>").unwrap(),
        Regex::new(r"(?i)<embed[^>]*>").unwrap(),
        // SQL injection
        Regex::new(r"(?i)\bunion\b.*\bselect\b").unwrap(),
        Regex::new(r"(?i)\bselect\b.*\bfrom\b").unwrap(),
        Regex::new(r"(?i)\b(insert|update|delete|drop|create|alter)\b\s+\w+").unwrap(),
        Regex::new(r"(?i)\b(or|and)\b\s+\d+\s*=\s*\d+").unwrap(),
        Regex::new(r"(?i)\b(exec|execute)\s*\(").unwrap(),
        // Command injection
        Regex::new(r"(?i)\b(eval|system|execfile)\s*\(").unwrap(),
        Regex::new(r"(?i);\s*\b(rm|wget|curl|nc|netcat)\b\s").unwrap(),
        // Path traversal
        Regex::new(r"\.\./").unwrap(),
        Regex::new(r"\.\.\\").unwrap(),
        Regex::new(r"(?i)%2e%2e%2f").unwrap(),
        Regex::new(r"(?i)%2e%2e%5c").unwrap(),
        // File inclusion
        Regex::new(r#"(?i)\b(include|require)(_once)?\b\s*['"][^'"]*\.\."#).unwrap(),
        // LDAP injection
        Regex::new(r#"(?i)\bldaps?\b\s*['"][^'"]*[()]"#).unwrap(),
        // NoSQL injection
        Regex::new(r"(?i)\$(where|ne|gt|lt|regex)\b").unwrap(),
    ]
});

/// Scheme markers that disqualify an otherwise well-formed email address.
static EMAIL_SUSPICIOUS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)javascript:").unwrap(),
        Regex::new(r"(?i)vbscript:").unwrap(),
        Regex::new(r"(?i)data:").unwrap(),
        Regex::new(r"(?i)<script").unwrap(),
        Regex::new(r"(?i)javascript\(").unwrap(),
        Regex::new(r"(?i)vbscript\(").unwrap(),
    ]
});

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static NAME_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s'-]+$").unwrap());

/// True if `text` matches any attack signature.
pub fn matches_suspicious(text: &str) -> bool {
    SUSPICIOUS_PATTERNS.iter().any(|p| p.is_match(text))
}

/// True only for a syntactically well-formed address with no embedded
/// suspicious scheme marker.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || !EMAIL_SHAPE.is_match(email) {
        return false;
    }
    !EMAIL_SUSPICIOUS.iter().any(|p| p.is_match(email))
}

/// Letters, spaces, hyphens and apostrophes only; 2 to 50 characters.
pub fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (2..=50).contains(&len) && NAME_SHAPE.is_match(name)
}
