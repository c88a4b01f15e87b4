//! Logging and tracing initialization.
//!
//! Call one of the `init_logging*` functions once at startup, **before**
//! creating the [`App`](crate::App). The log level is controlled via the
//! `RUST_LOG` environment variable:
//!
//! ```bash
//! # Show all logs including request traces
//! RUST_LOG=debug cargo run
//!
//! # Fine-grained control
//! RUST_LOG=warden=debug,tower_http=debug,sqlx=warn cargo run
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with sensible defaults.
///
/// Defaults to `info` when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging (recommended for production).
///
/// Outputs logs in JSON format for log aggregation systems.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
