//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, optional Prometheus exporter)
//!     → audit.rs (durable security event log, size-rotated)
//! ```
//!
//! # Design Decisions
//! - tracing is for operators, the audit log is the durable record
//! - Metrics are cheap (atomic increments behind the facade)
//! - Neither metrics nor audit failures ever fail a request

pub mod audit;
pub mod logging;
pub mod metrics;
