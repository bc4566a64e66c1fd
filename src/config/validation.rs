//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees. Collects every
//! problem instead of stopping at the first.

use crate::config::schema::SiteConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError(format!(
            "listener.bind_address is not a valid socket address: {}",
            config.listener.bind_address
        )));
    }
    if config.session.secret.is_empty() {
        errors.push(ValidationError("session.secret must not be empty".into()));
    }
    if config.session.ttl_secs == 0 {
        errors.push(ValidationError("session.ttl_secs must be positive".into()));
    }
    if config.csrf.ttl_secs == 0 {
        errors.push(ValidationError("csrf.ttl_secs must be positive".into()));
    }
    if config.rate_limit.global_limit == 0 || config.rate_limit.form_limit == 0 {
        errors.push(ValidationError("rate limits must be positive".into()));
    }
    if config.rate_limit.global_window_secs == 0 || config.rate_limit.form_window_secs == 0 {
        errors.push(ValidationError("rate limit windows must be positive".into()));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError("limits.max_body_bytes must be positive".into()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError(format!(
            "observability.metrics_address is not a valid socket address: {}",
            config.observability.metrics_address
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SiteConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SiteConfig::default();
        config.listener.bind_address = "nonsense".into();
        config.session.secret = "".into();
        config.rate_limit.global_limit = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
