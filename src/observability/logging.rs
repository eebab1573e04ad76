//! Structured logging.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to this
//! crate and to `tower_http` request spans.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(log_level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "visitor_profile={level},tower_http={level}",
        level = log_level
    ))
}
