//! Query matching against device descriptions.

use crate::discovery::{DeviceDesc, UpnpDevice};
use crate::query::DeviceQuery;

/// Wildcard suffix accepted at the end of a pattern.
const PREFIX_WILDCARD: &str = ".*";

/// Exact match, or prefix match when `pattern` ends with `.*`.
///
/// Case-sensitive. No other wildcard syntax.
pub fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == value {
        return true;
    }

    match pattern.strip_suffix(PREFIX_WILDCARD) {
        Some(prefix) => value.starts_with(prefix),
        None => false,
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern.is_empty() || pattern_matches(pattern, value)
}

impl DeviceDesc {
    /// Whether the description satisfies the query's model, manufacturer and
    /// serial number. Network and endpoints are not considered.
    pub fn matches(&self, query: &DeviceQuery) -> bool {
        field_matches(&query.model_name, &self.device.model_name)
            && field_matches(&query.manufacturer, &self.device.manufacturer)
            && field_matches(&query.serial_number, &self.device.serial_number)
    }
}

impl UpnpDevice {
    pub fn matches(&self, query: &DeviceQuery) -> bool {
        self.desc.matches(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{DeviceInfo, SpecVersion};

    fn make_desc(manufacturer: &str, model: &str, serial: &str) -> DeviceDesc {
        DeviceDesc {
            spec_version: SpecVersion::default(),
            device: DeviceInfo {
                manufacturer: manufacturer.to_string(),
                model_name: model.to_string(),
                serial_number: serial.to_string(),
            },
        }
    }

    #[test]
    fn test_pattern_matches() {
        let cases = [
            ("CamX200", "CamX200", true),
            ("CamX200", "CamX2000", false),
            ("CamX.*", "CamX200", true),
            ("CamX.*", "CamX", true),
            ("CamX.*", "camx200", false),
            ("CamX.*", "Cam", false),
            (".*", "anything", true),
            (".*", "", true),
            ("Cam*", "CamX", false),
            ("C.*X", "CamX", false),
            ("CamX.*", "CamX.*", true),
            ("", "", true),
            ("", "CamX", false),
        ];

        for (pattern, value, expected) in cases {
            assert_eq!(
                pattern_matches(pattern, value),
                expected,
                "pattern {:?} against {:?}",
                pattern,
                value
            );
        }
    }

    #[test]
    fn test_empty_query_matches_anything() {
        let query = DeviceQuery::default();
        assert!(make_desc("Acme", "CamX200", "SN-1").matches(&query));
        assert!(make_desc("", "", "").matches(&query));
    }

    #[test]
    fn test_all_fields_must_match() {
        let desc = make_desc("Acme", "CamX200", "SN-0042");

        let query = DeviceQuery {
            model_name: "CamX.*".to_string(),
            manufacturer: "Acme".to_string(),
            serial_number: "SN-.*".to_string(),
            ..Default::default()
        };
        assert!(desc.matches(&query));

        let wrong_maker = DeviceQuery {
            manufacturer: "Globex".to_string(),
            ..query.clone()
        };
        assert!(!desc.matches(&wrong_maker));

        let wrong_serial = DeviceQuery {
            serial_number: "SN-0043".to_string(),
            ..query
        };
        assert!(!desc.matches(&wrong_serial));
    }

    #[test]
    fn test_network_and_endpoints_ignored() {
        let desc = make_desc("Acme", "CamX200", "");
        let query = DeviceQuery {
            model_name: "CamX200".to_string(),
            network: "wlan0".to_string(),
            endpoints: vec!["stream".to_string()],
            ..Default::default()
        };
        assert!(desc.matches(&query));
    }
}
