//! Logging setup.
//!
//! Log events are written to a file since standard output carries the results of
//! the driver. Filtering is controlled by `HYDRO_LOG` using the directive syntax of
//! [`EnvFilter`], defaulting to `info`.

use crate::error::{Error, Result};
use crate::sys::AsString;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Name of the environment variable holding filter directives.
pub const LOG_ENV: &str = "HYDRO_LOG";

/// Installs the global subscriber, writing events to the file at `path`.
pub fn init<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(&path.as_string(), e))?;
    // A subscriber already being installed is not an error for the caller.
    let _ = build_subscriber(file).try_init();
    Ok(())
}

/// Returns a subscriber writing to `file` and filtered by [`LOG_ENV`].
pub fn build_subscriber(file: File) -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file));
    tracing_subscriber::registry().with(fmt_layer).with(filter)
}
