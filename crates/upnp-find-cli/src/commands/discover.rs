//! Discover command implementation.

use std::time::Duration;

use upnp_find_core::{FinderConfig, HostFinder};

use super::{bounded, spinner};
use crate::cli::DiscoverArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the discover command
pub async fn run_discover(
    args: DiscoverArgs,
    config: FinderConfig,
    deadline: Option<Duration>,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);
    let networks = distinct_networks(&args.network);
    let finder = HostFinder::upnp(config)?;

    let pb = spinner("Discovering devices...".to_string());
    let result = bounded(deadline, async {
        Ok(finder.devices(&networks, args.root_only).await?)
    })
    .await;
    pb.finish_and_clear();

    let devices = result?;
    println!("{}", formatter.format_devices(&devices));

    if devices.is_empty() {
        return Err(CliError::NoDevicesFound);
    }

    Ok(())
}

fn distinct_networks(networks: &[String]) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::new();
    for network in networks {
        if !network.is_empty() && !distinct.contains(network) {
            distinct.push(network.clone());
        }
    }
    distinct
}
