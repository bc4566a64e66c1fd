//! Request gatekeeper: the per-request security pipeline.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → block-list check          (403 if listed)
//!     → global rate limit         (429 on denial)
//!     → suspicious-pattern scan   (400 + permanent block on match)
//!     → session resolve/create    (signed cookie)
//!     → opportunistic housekeeping
//!     → route handler
//! ```
//!
//! # Design Decisions
//! - Cheap local checks run before the pattern scan
//! - Any positive malice signal escalates to a permanent block, not a
//!   transient one; entries survive until process restart
//! - All state is owned here and injected at construction, no globals

use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::config::SiteConfig;
use crate::error::SecurityError;
use crate::observability::audit::SecurityLog;
use crate::observability::metrics;
use crate::security::csrf::CsrfStore;
use crate::security::patterns;
use crate::security::rate_limit::RateLimiter;
use crate::security::session::SessionStore;

/// Housekeeping fires on roughly one request in this many.
const HOUSEKEEPING_ONE_IN: u32 = 64;

/// Session identity attached to admitted requests.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub id: String,
    /// Present when the session was created by this request.
    set_cookie: Option<String>,
}

/// Owner of all mutable security state, shared via `Arc`.
pub struct Gatekeeper {
    blocklist: Mutex<HashSet<IpAddr>>,
    limiter: RateLimiter,
    pub csrf: CsrfStore,
    pub sessions: SessionStore,
    pub audit: Arc<SecurityLog>,
    max_scan_bytes: usize,
}

impl Gatekeeper {
    pub fn new(config: &SiteConfig, audit: Arc<SecurityLog>) -> Self {
        Self {
            blocklist: Mutex::new(HashSet::new()),
            limiter: RateLimiter::new(
                config.rate_limit.global_limit,
                Duration::from_secs(config.rate_limit.global_window_secs),
            ),
            csrf: CsrfStore::new(Duration::from_secs(config.csrf.ttl_secs)),
            sessions: SessionStore::new(
                config.session.secret.clone(),
                Duration::from_secs(config.session.ttl_secs),
                config.session.cookie_secure,
            ),
            audit,
            max_scan_bytes: config.limits.max_body_bytes,
        }
    }

    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        self.blocklist.lock().expect("blocklist mutex poisoned").contains(&ip)
    }

    /// Permanently exclude `ip` (until restart).
    pub fn block(&self, ip: IpAddr) {
        self.blocklist.lock().expect("blocklist mutex poisoned").insert(ip);
    }

    /// Run the pipeline. Returns the (re-assembled) request and its session
    /// context on admission.
    async fn inspect(
        &self,
        ip: IpAddr,
        request: Request<Body>,
    ) -> Result<(Request<Body>, SessionContext), SecurityError> {
        if self.is_blocked(ip) {
            tracing::warn!(client = %ip, "request from blocked ip");
            metrics::record_blocked("blocklist");
            return Err(SecurityError::ClientBlocked);
        }

        if !self.limiter.allow(ip) {
            tracing::warn!(client = %ip, "global rate limit exceeded");
            metrics::record_rate_limited("global");
            return Err(SecurityError::RateLimited);
        }

        // The scan needs the body, so buffer it and re-assemble the request
        // afterwards. The body-limit layer sits outside this middleware, but
        // the cap here keeps the scan bounded regardless.
        let (parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, self.max_scan_bytes).await {
            Ok(bytes) => bytes,
            Err(err) if is_length_limit(&err) => {
                tracing::warn!(client = %ip, "request body over size limit");
                return Err(SecurityError::PayloadTooLarge);
            }
            Err(err) => return Err(SecurityError::Internal(format!("body read failed: {err}"))),
        };

        if patterns::matches_suspicious(&serialize_for_scan(&parts, &bytes)) {
            tracing::warn!(client = %ip, path = %parts.uri.path(), "suspicious request, blocking ip");
            metrics::record_suspicious();
            metrics::record_blocked("suspicious");
            self.block(ip);
            self.audit
                .log("SUSPICIOUS_REQUEST", &format!("ip={} path={}", ip, parts.uri.path()));
            self.audit.log("BLOCKED_IP", &ip.to_string());
            return Err(SecurityError::SuspiciousRequest);
        }

        let cookie_header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok());
        let session = match self.sessions.resolve(cookie_header) {
            Some(id) => SessionContext {
                id,
                set_cookie: None,
            },
            None => {
                let (id, value) = self.sessions.create();
                let set_cookie = self.sessions.set_cookie_header(&value);
                SessionContext {
                    id,
                    set_cookie: Some(set_cookie),
                }
            }
        };

        // Jittered housekeeping instead of a wall-clock schedule
        if fastrand::u32(0..HOUSEKEEPING_ONE_IN) == 0 {
            self.housekeeping();
        }

        let mut request = Request::from_parts(parts, Body::from(bytes));
        request.extensions_mut().insert(session.clone());
        Ok((request, session))
    }

    /// Expire CSRF records and sessions, drop idle rate windows.
    pub fn housekeeping(&self) {
        tracing::debug!("running security housekeeping");
        self.csrf.prune_expired();
        self.sessions.prune_expired();
        self.limiter.prune_idle();
    }
}

/// True when a body-read error traces back to a size limit, either this
/// middleware's own cap or the outer body-limit layer.
fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(cause) = source {
        if cause.downcast_ref::<http_body_util::LengthLimitError>().is_some() {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Flatten method, path, query and headers plus the body into one scan text.
///
/// URI and body are percent-decoded first so encoded payloads cannot slip
/// past the word-boundary anchors in the signatures.
fn serialize_for_scan(parts: &axum::http::request::Parts, body: &[u8]) -> String {
    let uri = parts.uri.to_string();
    let uri = urlencoding::decode(&uri).unwrap_or(std::borrow::Cow::Borrowed(&uri));

    let mut text = format!("{} {}\n", parts.method, uri);
    for (name, value) in parts.headers.iter() {
        text.push_str(name.as_str());
        text.push_str(": ");
        text.push_str(value.to_str().unwrap_or(""));
        text.push('\n');
    }
    text.push('\n');

    let body = String::from_utf8_lossy(body);
    match urlencoding::decode(&body) {
        Ok(decoded) => text.push_str(&decoded),
        Err(_) => text.push_str(&body),
    }
    text
}

/// Middleware wrapper around [`Gatekeeper::inspect`].
///
/// Every terminal failure inside the pipeline, expected or not, resolves to
/// exactly one JSON error response here.
pub async fn gatekeeper_middleware(
    State(gate): State<Arc<Gatekeeper>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match gate.inspect(addr.ip(), request).await {
        Ok((request, session)) => {
            let mut response = next.run(request).await;
            metrics::record_request(response.status().as_u16());
            if let Some(cookie) = session.set_cookie {
                if let Ok(value) = HeaderValue::from_str(&cookie) {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
            }
            response
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn gatekeeper() -> Gatekeeper {
        let config = SiteConfig::default();
        let path = std::env::temp_dir().join(format!("siteguard-gate-{}.log", uuid::Uuid::new_v4()));
        let audit = Arc::new(SecurityLog::open(path, 1024 * 1024, 1).unwrap());
        Gatekeeper::new(&config, audit)
    }

    fn request_with_body(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/submit-form")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_admits_clean_request() {
        let gate = gatekeeper();
        let ip: IpAddr = "10.1.1.1".parse().unwrap();

        let result = gate.inspect(ip, request_with_body("name=Jane&year=senior")).await;
        let (request, session) = result.expect("clean request admitted");
        assert!(!session.id.is_empty());
        assert!(session.set_cookie.is_some());
        assert!(request.extensions().get::<SessionContext>().is_some());
    }

    #[tokio::test]
    async fn test_suspicious_body_blocks_identity() {
        let gate = gatekeeper();
        let ip: IpAddr = "10.1.1.2".parse().unwrap();

        let result = gate
            .inspect(ip, request_with_body("<script>alert(1)</script>"))
            .await;
        assert!(matches!(result, Err(SecurityError::SuspiciousRequest)));
        assert!(gate.is_blocked(ip));

        // Subsequent request from the same identity fails the first check,
        // regardless of content
        let result = gate.inspect(ip, request_with_body("name=Jane")).await;
        assert!(matches!(result, Err(SecurityError::ClientBlocked)));
    }

    #[tokio::test]
    async fn test_suspicious_path_blocks_identity() {
        let gate = gatekeeper();
        let ip: IpAddr = "10.1.1.3".parse().unwrap();

        let request = Request::builder()
            .uri("/../../etc/passwd")
            .body(Body::empty())
            .unwrap();
        let result = gate.inspect(ip, request).await;
        assert!(matches!(result, Err(SecurityError::SuspiciousRequest)));
    }

    #[tokio::test]
    async fn test_oversize_body_is_payload_too_large() {
        let mut config = SiteConfig::default();
        config.limits.max_body_bytes = 32;
        let path = std::env::temp_dir().join(format!("siteguard-gate-{}.log", uuid::Uuid::new_v4()));
        let audit = Arc::new(SecurityLog::open(path, 1024 * 1024, 1).unwrap());
        let gate = Gatekeeper::new(&config, audit);
        let ip: IpAddr = "10.1.1.6".parse().unwrap();

        let result = gate.inspect(ip, request_with_body(&"a=b&".repeat(32))).await;
        assert!(matches!(result, Err(SecurityError::PayloadTooLarge)));
        // Oversize is a client error, not a malice signal
        assert!(!gate.is_blocked(ip));
    }

    #[tokio::test]
    async fn test_rate_limit_denial() {
        let mut config = SiteConfig::default();
        config.rate_limit.global_limit = 2;
        let path = std::env::temp_dir().join(format!("siteguard-gate-{}.log", uuid::Uuid::new_v4()));
        let audit = Arc::new(SecurityLog::open(path, 1024 * 1024, 1).unwrap());
        let gate = Gatekeeper::new(&config, audit);
        let ip: IpAddr = "10.1.1.4".parse().unwrap();

        assert!(gate.inspect(ip, request_with_body("a=b")).await.is_ok());
        assert!(gate.inspect(ip, request_with_body("a=b")).await.is_ok());
        let result = gate.inspect(ip, request_with_body("a=b")).await;
        assert!(matches!(result, Err(SecurityError::RateLimited)));
    }

    #[tokio::test]
    async fn test_session_reuse_across_requests() {
        let gate = gatekeeper();
        let ip: IpAddr = "10.1.1.5".parse().unwrap();

        let (_, first) = gate.inspect(ip, request_with_body("a=b")).await.unwrap();
        let cookie = first.set_cookie.unwrap();
        let cookie_value = cookie.split(';').next().unwrap().to_string();

        let request = Request::builder()
            .uri("/")
            .header(header::COOKIE, cookie_value.as_str())
            .body(Body::empty())
            .unwrap();
        let (_, second) = gate.inspect(ip, request).await.unwrap();
        assert_eq!(second.id, first.id);
        assert!(second.set_cookie.is_none());
    }
}
