//! Tracing and error-report setup shared by the service binaries.

use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter, Layer};

/// Install the color-eyre panic and error hooks.
///
/// Call once at the top of `main`, before anything fallible. Repeated
/// calls are harmless; later installs are ignored.
pub fn install_error_hooks() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize the global tracing subscriber.
///
/// Production gets JSON output with flattened event fields for log
/// aggregation; development gets pretty human-readable output. Both carry
/// `tracing_error::ErrorLayer` so error reports include span traces.
///
/// The filter comes from `RUST_LOG` when set, otherwise `info` in
/// production and `debug` in development.
///
/// Idempotent: a subscriber installed earlier (common in tests) wins and
/// the call is a no-op.
pub fn init(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if environment.is_production() {
            "info"
        } else {
            "debug"
        })
    });

    let fmt_layer = if environment.is_production() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .flatten_event(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let installed = tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(filter)
        .with(fmt_layer)
        .try_init();

    if installed.is_ok() {
        info!(environment = ?environment, "Tracing initialized");
    } else {
        debug!("Tracing subscriber already set, keeping the existing one");
    }
}
