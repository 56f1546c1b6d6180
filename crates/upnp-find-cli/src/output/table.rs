//! Table-formatted output for CLI.

use comfy_table::{Cell, ContentArrangement, Table};

use super::OutputFormatter;
use upnp_find_core::{HostMatches, UpnpDevice};

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    /// One host per line, so the output pipes cleanly.
    fn format_hosts(&self, matches: &HostMatches) -> String {
        matches.hostnames.join("\n")
    }

    fn format_devices(&self, devices: &[UpnpDevice]) -> String {
        if devices.is_empty() {
            return "No devices found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Location", "Manufacturer", "Model", "Serial", "Type"]);

        for device in devices {
            table.add_row(vec![
                Cell::new(&device.service.location),
                Cell::new(&device.desc.device.manufacturer),
                Cell::new(&device.desc.device.model_name),
                Cell::new(&device.desc.device.serial_number),
                Cell::new(&device.service.search_type),
            ]);
        }

        format!("{}\n\nFound {} device(s)", table, devices.len())
    }
}
