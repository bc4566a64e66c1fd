//! Static asset passthrough and CSRF token binding.
//!
//! # Responsibilities
//! - Read the three site assets from the configured directory
//! - Bind a freshly issued CSRF token into the page template
//!
//! # Design Decisions
//! - The page carries a named `{{ csrf_token }}` placeholder; binding is by
//!   placeholder name, never by matching closing-tag text
//! - Assets are read per request; they are small and the OS cache covers it

use std::path::{Path, PathBuf};

use crate::error::SecurityError;

/// Placeholder the index page must carry inside its form markup.
pub const CSRF_PLACEHOLDER: &str = "{{ csrf_token }}";

pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read a named asset. Callers pass fixed names only; nothing derived
    /// from the request path ever reaches this function.
    pub async fn read(&self, name: &str) -> Result<String, SecurityError> {
        let path = self.dir.join(name);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            SecurityError::Internal(format!("failed to read asset {}: {}", path.display(), e))
        })
    }

    /// Read the index page with `token` bound into its placeholder.
    pub async fn index_with_token(&self, token: &str) -> Result<String, SecurityError> {
        let page = self.read("index.html").await?;
        Ok(render_csrf_token(&page, token))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn render_csrf_token(page: &str, token: &str) -> String {
    page.replace(CSRF_PLACEHOLDER, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binds_token_into_placeholder() {
        let page = r#"<form><input type="hidden" name="csrf_token" value="{{ csrf_token }}"></form>"#;
        let out = render_csrf_token(page, "tok123");
        assert!(out.contains(r#"value="tok123""#));
        assert!(!out.contains(CSRF_PLACEHOLDER));
    }

    #[test]
    fn test_page_without_placeholder_unchanged() {
        let page = "<html><body>no forms here</body></html>";
        assert_eq!(render_csrf_token(page, "tok"), page);
    }
}
