//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file, and
//! every field has a default so a minimal (or absent) config works.

use serde::{Deserialize, Serialize};

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener settings (bind address).
    pub listener: ListenerConfig,

    /// Static asset settings.
    pub assets: AssetConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Rate limiting settings for both limiter instances.
    pub rate_limit: RateLimitConfig,

    /// CSRF token settings.
    pub csrf: CsrfConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security audit log settings.
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding index.html, styles.css and script.js.
    pub dir: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: "assets".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie signing secret. Overridden by the SECRET_KEY environment
    /// variable; the default is for development only.
    pub secret: String,

    /// Server-side session lifetime in seconds.
    pub ttl_secs: u64,

    /// Set the Secure cookie attribute. Disable only behind plain HTTP
    /// (development, tests).
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: "dev-secret-change-me".to_string(),
            ttl_secs: 3600,
            cookie_secure: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Broad per-request throttle applied to every route.
    pub global_limit: usize,
    pub global_window_secs: u64,

    /// Stricter throttle applied only to the form endpoint.
    pub form_limit: usize,
    pub form_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_limit: 20,
            global_window_secs: 60,
            form_limit: 5,
            form_window_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Token lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Path of the security event log.
    pub path: String,

    /// Rotation threshold in bytes.
    pub max_size_bytes: u64,

    /// Number of rotated backups to keep.
    pub max_backups: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: "logs/security.log".to_string(),
            max_size_bytes: 10 * 1024 * 1024,
            max_backups: 5,
        }
    }
}
