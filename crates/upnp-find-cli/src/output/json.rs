//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::{json, Value};

use super::OutputFormatter;
use upnp_find_core::{HostMatches, UpnpDevice};

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_hosts(&self, matches: &HostMatches) -> String {
        Self::to_json(&json!({
            "hosts": matches.hostnames,
            "matchedQueries": matches.queries,
            "count": matches.hostnames.len()
        }))
    }

    fn format_devices(&self, devices: &[UpnpDevice]) -> String {
        let items: Vec<Value> = devices
            .iter()
            .map(|d| {
                json!({
                    "location": d.service.location,
                    "searchType": d.service.search_type,
                    "usn": d.service.usn,
                    "server": d.service.server,
                    "manufacturer": d.desc.device.manufacturer,
                    "modelName": d.desc.device.model_name,
                    "serialNumber": d.desc.device.serial_number,
                    "specVersion": format!(
                        "{}.{}",
                        d.desc.spec_version.major, d.desc.spec_version.minor
                    ),
                })
            })
            .collect();

        Self::to_json(&json!({
            "devices": items,
            "count": devices.len()
        }))
    }
}
