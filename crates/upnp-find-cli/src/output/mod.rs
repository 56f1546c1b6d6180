//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use upnp_find_core::{HostMatches, UpnpDevice};

/// Output formatter trait
pub trait OutputFormatter {
    /// Format the hosts resolved for a query batch
    fn format_hosts(&self, matches: &HostMatches) -> String;

    /// Format every discovered device
    fn format_devices(&self, devices: &[UpnpDevice]) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
