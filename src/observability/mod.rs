//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the resolver produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached to every request span
//! - Metrics are no-ops unless the exporter is installed

pub mod logging;
pub mod metrics;
