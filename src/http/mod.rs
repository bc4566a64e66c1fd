//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → security pipeline (gatekeeper, see security/)
//!     → handlers.rs (routes) + assets.rs (static files, token binding)
//!     → security headers on the way out
//! ```

pub mod assets;
pub mod handlers;
pub mod server;

pub use server::HttpServer;
