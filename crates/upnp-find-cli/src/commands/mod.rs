//! Command implementations.

pub mod discover;
pub mod find;

pub use discover::run_discover;
pub use find::run_find;

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;

/// Run `work` until it finishes, the deadline passes, or Ctrl+C.
///
/// Dropping `work` on timeout or interrupt cancels every pending search and
/// fetch, so nothing partial is reported.
pub async fn bounded<T, F>(deadline: Option<Duration>, work: F) -> Result<T, CliError>
where
    F: Future<Output = Result<T, CliError>>,
{
    let limited = async {
        match deadline {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| CliError::Timeout(limit.as_secs()))?,
            None => work.await,
        }
    };

    tokio::select! {
        result = limited => result,
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    }
}

/// Spinner on stderr; hidden when stderr is not a terminal.
pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
    {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
