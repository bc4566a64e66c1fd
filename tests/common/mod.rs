//! Shared utilities for integration testing.

use std::net::SocketAddr;

use siteguard::config::SiteConfig;
use siteguard::http::HttpServer;
use siteguard::lifecycle::Shutdown;

/// Start a server on an ephemeral port with test-friendly defaults.
///
/// Assets come from the repo's `assets/` directory; the audit log goes to a
/// unique temp file; the session cookie drops `Secure` so a plain-HTTP test
/// client will send it back.
pub async fn spawn_server(mutate: impl FnOnce(&mut SiteConfig)) -> (SocketAddr, Shutdown) {
    let mut config = SiteConfig::default();
    config.session.cookie_secure = false;
    config.audit.path = std::env::temp_dir()
        .join(format!("siteguard-test-{}.log", uuid::Uuid::new_v4()))
        .display()
        .to_string();
    mutate(&mut config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Client with a cookie store, no proxy, no pooling surprises.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .no_proxy()
        .build()
        .unwrap()
}

/// Pull the bound CSRF token out of the served index page.
pub fn extract_csrf_token(page: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = page.find(marker).expect("hidden csrf field present") + marker.len();
    let end = page[start..].find('"').expect("closing quote") + start;
    page[start..end].to_string()
}
