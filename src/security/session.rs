//! Browser session identity.
//!
//! # Responsibilities
//! - Assign a random session id on first contact
//! - Carry it in a signed, HttpOnly cookie
//! - Expire server-side records after the session TTL
//!
//! # Design Decisions
//! - Cookie value is `<uuid>.<hex sha256(secret || uuid)>`; a bad or forged
//!   signature is treated the same as no cookie at all
//! - Session ids are never mutated; records are only created and expired

use std::time::{Duration, Instant};

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

/// Server-side session records keyed by session id.
pub struct SessionStore {
    sessions: DashMap<String, Instant>,
    ttl: Duration,
    secret: String,
    cookie_secure: bool,
}

impl SessionStore {
    pub fn new(secret: String, ttl: Duration, cookie_secure: bool) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            secret,
            cookie_secure,
        }
    }

    /// Create a fresh session and return `(id, cookie value)`.
    pub fn create(&self) -> (String, String) {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), Instant::now());
        let value = format!("{}.{}", id, self.sign(&id));
        (id, value)
    }

    /// Resolve a session id from a `Cookie` request header.
    ///
    /// Returns `None` for a missing cookie, a bad signature, an unknown id
    /// (e.g. after restart) or an expired record.
    pub fn resolve(&self, cookie_header: Option<&str>) -> Option<String> {
        self.resolve_at(cookie_header, Instant::now())
    }

    pub fn resolve_at(&self, cookie_header: Option<&str>, now: Instant) -> Option<String> {
        let value = cookie_value(cookie_header?, SESSION_COOKIE)?;
        let (id, signature) = value.rsplit_once('.')?;
        if self.sign(id) != signature {
            return None;
        }

        let created = *self.sessions.get(id)?;
        if now.duration_since(created) > self.ttl {
            self.sessions.remove(id);
            return None;
        }
        Some(id.to_string())
    }

    /// `Set-Cookie` header value for a freshly created session.
    pub fn set_cookie_header(&self, cookie_value: &str) -> String {
        let mut header = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            cookie_value,
            self.ttl.as_secs()
        );
        if self.cookie_secure {
            header.push_str("; Secure");
        }
        header
    }

    /// Remove expired records. Housekeeping entry point.
    pub fn prune_expired(&self) {
        self.prune_expired_at(Instant::now());
    }

    pub fn prune_expired_at(&self, now: Instant) {
        self.sessions
            .retain(|_, created| now.duration_since(*created) <= self.ttl);
    }

    fn sign(&self, id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(id.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Extract a named cookie from a `Cookie` header.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}
