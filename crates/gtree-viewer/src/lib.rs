#![forbid(unsafe_code)]

//! Terminal viewer for a binary genealogy tree.
//!
//! - [`cli`] reads flags and `GTREE_*` variables.
//! - [`api`] loads the tree from the referrals API, a file, or the fixture.
//! - [`app`] is the [`gtree_runtime::Model`] tying the canvas together.
//! - [`logging`] sends `tracing` output to a file.

pub mod api;
pub mod app;
pub mod cli;
pub mod logging;

use std::fmt;

use api::{DataSource, FetchError, GenealogyClient};
use cli::Opts;

/// Errors that stop the viewer before the UI starts.
#[derive(Debug)]
pub enum StartupError {
    /// No `--file`, `--fixture` or API URL was given.
    NoSource,
    /// The HTTP client could not be built.
    Client(FetchError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSource => write!(
                f,
                "No data source: pass --api-url=URL (or GTREE_API_URL), --file=PATH, or --fixture"
            ),
            Self::Client(err) => write!(f, "Cannot set up the API client: {err}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Pick the data source: a file, then the fixture, then the live API.
pub fn data_source(opts: &Opts) -> Result<DataSource, StartupError> {
    if let Some(path) = &opts.file {
        return Ok(DataSource::File(path.clone()));
    }
    if opts.fixture {
        return Ok(DataSource::Fixture);
    }
    match opts.api_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => GenealogyClient::new(url, opts.token.clone(), opts.timeout())
            .map(DataSource::Remote)
            .map_err(StartupError::Client),
        None => Err(StartupError::NoSource),
    }
}
