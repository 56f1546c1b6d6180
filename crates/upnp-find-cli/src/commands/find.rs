//! Find command implementation.

use std::time::Duration;

use tracing::info;
use upnp_find_core::{load_queries, DeviceQuery, FinderConfig, HostFinder};

use super::{bounded, spinner};
use crate::cli::FindArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the find command
pub async fn run_find(
    args: FindArgs,
    config: FinderConfig,
    deadline: Option<Duration>,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let queries = collect_queries(&args).await?;
    info!("resolving {} query(ies)", queries.len());

    let finder = HostFinder::upnp(config)?;

    let pb = spinner(format!("Searching for {} query(ies)...", queries.len()));
    let result = bounded(deadline, async {
        Ok(finder.find_host_matches(&queries, args.root_only).await?)
    })
    .await;
    pb.finish_and_clear();

    let matches = result?;
    println!("{}", formatter.format_hosts(&matches));

    Ok(())
}

async fn collect_queries(args: &FindArgs) -> Result<Vec<DeviceQuery>, CliError> {
    let Some(path) = &args.queries else {
        return Ok(vec![args.inline_query()]);
    };

    let queries = load_queries(path).await?;
    if queries.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "{} holds no queries",
            path.display()
        )));
    }

    Ok(queries)
}
