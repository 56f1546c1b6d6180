//! Tunables for a discovery pass.

use std::time::Duration;

/// How long an SSDP search collects responses.
pub const DEFAULT_SEARCH_WINDOW: Duration = Duration::from_secs(1);

/// Upper bound on a single device description fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Description fetches in flight per search.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct FinderConfig {
    pub search_window: Duration,
    pub fetch_timeout: Duration,
    pub fetch_concurrency: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            search_window: DEFAULT_SEARCH_WINDOW,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}
