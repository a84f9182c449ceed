#![forbid(unsafe_code)]

//! Log file setup.
//!
//! The terminal belongs to the UI, so events go to a file. The filter takes
//! `EnvFilter` directives (`info`, `gtree_widgets=debug,warn`, ...); a
//! directive string that does not parse falls back to `info`.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Parse filter directives, falling back to `info`.
pub fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, appending to `path`.
///
/// # Errors
///
/// Fails if the file cannot be opened or a subscriber is already set.
pub fn init(path: &Path, directives: &str) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));
    tracing_subscriber::registry()
        .with(env_filter(directives))
        .with(layer)
        .try_init()
        .map_err(io::Error::other)?;
    tracing::info!(path = %path.display(), filter = directives, "logging started");
    Ok(())
}
