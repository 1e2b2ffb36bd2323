//! Tracing subscriber setup for the helper binaries.
//!
//! The library only emits `tracing` events; binaries decide where they go.
//! `RUST_LOG` controls filtering and defaults to `warn` when unset.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber, writing to stderr.
///
/// With `json` set, events are emitted as one JSON object per line so they
/// can be interleaved with the NDJSON records on stdout without confusion.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing(json: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }
    Ok(())
}
