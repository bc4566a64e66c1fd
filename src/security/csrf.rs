//! CSRF token issuance and validation.
//!
//! One active token per session, overwritten on reissue. Tokens stay valid
//! for repeated submissions until the TTL expires; they are session-scoped,
//! not single-use.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Token length in characters. 43 alphanumeric characters carry just over
/// 256 bits of entropy (log2(62) * 43).
const TOKEN_LEN: usize = 43;

struct CsrfRecord {
    token: String,
    issued: Instant,
}

/// In-memory store of per-session CSRF tokens with a TTL.
pub struct CsrfStore {
    records: Mutex<HashMap<String, CsrfRecord>>,
    ttl: Duration,
}

impl CsrfStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Generate a fresh token for `session_id`, replacing any prior one.
    pub fn issue(&self, session_id: &str) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();

        let mut records = self.records.lock().expect("csrf store mutex poisoned");
        records.insert(
            session_id.to_string(),
            CsrfRecord {
                token: token.clone(),
                issued: Instant::now(),
            },
        );
        token
    }

    /// Check `presented` against the stored token for `session_id`.
    ///
    /// Expired records are removed as a side effect of the failed check.
    pub fn validate(&self, session_id: &str, presented: &str) -> bool {
        self.validate_at(session_id, presented, Instant::now())
    }

    pub fn validate_at(&self, session_id: &str, presented: &str, now: Instant) -> bool {
        let mut records = self.records.lock().expect("csrf store mutex poisoned");
        let Some(record) = records.get(session_id) else {
            return false;
        };

        if now.duration_since(record.issued) > self.ttl {
            records.remove(session_id);
            return false;
        }

        constant_time_eq(record.token.as_bytes(), presented.as_bytes())
    }

    /// Remove all expired records. Housekeeping entry point.
    pub fn prune_expired(&self) {
        self.prune_expired_at(Instant::now());
    }

    pub fn prune_expired_at(&self, now: Instant) {
        let mut records = self.records.lock().expect("csrf store mutex poisoned");
        records.retain(|_, r| now.duration_since(r.issued) <= self.ttl);
    }
}

/// Equality without early exit, so the comparison does not leak how many
/// leading bytes matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
