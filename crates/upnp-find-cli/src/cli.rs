//! CLI argument definitions using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use upnp_find_core::{DeviceQuery, FinderConfig};

/// upnp-find - locate UPnP devices by model, manufacturer and serial number
#[derive(Parser, Debug)]
#[command(name = "upnp-find")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// SSDP response collection window in seconds
    #[arg(long, global = true, default_value = "1", env = "UPNP_FIND_WINDOW")]
    pub window_secs: u64,

    /// Timeout for each device description fetch in seconds
    #[arg(long, global = true, default_value = "10", env = "UPNP_FIND_FETCH_TIMEOUT")]
    pub fetch_timeout_secs: u64,

    /// Give up on the whole call after this many seconds
    #[arg(long, global = true, env = "UPNP_FIND_DEADLINE")]
    pub deadline_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig {
            search_window: Duration::from_secs(self.window_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            ..Default::default()
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the hosts of devices matching one or more queries
    Find(FindArgs),

    /// List every device that answers a search
    Discover(DiscoverArgs),
}

// ==================== Find ====================

#[derive(Args, Debug)]
pub struct FindArgs {
    /// JSON file holding an array of queries (replaces the inline query flags)
    #[arg(
        short,
        long,
        conflicts_with_all = ["model", "manufacturer", "serial", "network", "endpoint"]
    )]
    pub queries: Option<PathBuf>,

    /// Model name, exact or prefix ending in ".*"
    #[arg(short, long)]
    pub model: Option<String>,

    /// Manufacturer, exact or prefix ending in ".*"
    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Serial number, exact or prefix ending in ".*"
    #[arg(short, long)]
    pub serial: Option<String>,

    /// Local address or interface to search on
    #[arg(short, long)]
    pub network: Option<String>,

    /// Endpoint appended to each matched host (repeatable)
    #[arg(short, long)]
    pub endpoint: Vec<String>,

    /// Only search for root devices
    #[arg(long)]
    pub root_only: bool,
}

impl FindArgs {
    /// The single query described by the inline flags.
    pub fn inline_query(&self) -> DeviceQuery {
        DeviceQuery {
            model_name: self.model.clone().unwrap_or_default(),
            manufacturer: self.manufacturer.clone().unwrap_or_default(),
            serial_number: self.serial.clone().unwrap_or_default(),
            network: self.network.clone().unwrap_or_default(),
            endpoints: self.endpoint.clone(),
        }
    }
}

// ==================== Discover ====================

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Local address or interface to search on (repeatable; default interface if omitted)
    #[arg(short, long)]
    pub network: Vec<String>,

    /// Only search for root devices
    #[arg(long)]
    pub root_only: bool,
}
