//! Device queries and query-batch helpers.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QueryFileError;

/// Criteria a discovered device must satisfy.
///
/// Empty fields are wildcards. `model_name`, `manufacturer` and `serial_number`
/// accept an exact value or a prefix ending in `.*`. `network` scopes the
/// search, `endpoints` shapes the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceQuery {
    pub model_name: String,
    pub manufacturer: String,
    pub serial_number: String,
    pub network: String,
    pub endpoints: Vec<String>,
}

impl fmt::Display for DeviceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (key, value) in [
            ("model_name", &self.model_name),
            ("manufacturer", &self.manufacturer),
            ("serial_number", &self.serial_number),
            ("network", &self.network),
        ] {
            if !value.is_empty() {
                parts.push(format!("{}={}", key, value));
            }
        }
        if !self.endpoints.is_empty() {
            parts.push(format!("endpoints=[{}]", self.endpoints.join(",")));
        }
        write!(f, "{{{}}}", parts.join(" "))
    }
}

/// Distinct non-empty networks named by the batch, in order of first appearance.
pub fn parse_networks(queries: &[DeviceQuery]) -> Vec<String> {
    let mut networks: Vec<String> = Vec::new();
    for query in queries {
        if !query.network.is_empty() && !networks.contains(&query.network) {
            networks.push(query.network.clone());
        }
    }
    networks
}

/// Parse a JSON array of queries.
pub fn parse_queries(json: &str) -> Result<Vec<DeviceQuery>, QueryFileError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a JSON array of queries from a file.
pub async fn load_queries(path: impl AsRef<Path>) -> Result<Vec<DeviceQuery>, QueryFileError> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_queries(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn on_network(network: &str) -> DeviceQuery {
        DeviceQuery {
            network: network.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_networks_dedups_in_order() {
        // Regression: every distinct network is searched exactly once,
        // including networks named by a single query.
        let queries = vec![on_network("eth0"), on_network("eth0"), on_network("wlan0")];
        assert_eq!(parse_networks(&queries), vec!["eth0", "wlan0"]);
    }

    #[test]
    fn test_parse_networks_single_occurrence() {
        let queries = vec![on_network("wlan0")];
        assert_eq!(parse_networks(&queries), vec!["wlan0"]);
    }

    #[test]
    fn test_parse_networks_skips_empty() {
        let queries = vec![on_network(""), on_network("eth1"), DeviceQuery::default()];
        assert_eq!(parse_networks(&queries), vec!["eth1"]);
        assert!(parse_networks(&[DeviceQuery::default()]).is_empty());
    }

    #[test]
    fn test_parse_queries_defaults_missing_fields() {
        let json = r#"[
            {"model_name": "CamX.*", "endpoints": ["stream1", "stream2"]},
            {"manufacturer": "Acme", "network": "eth0"}
        ]"#;

        let queries = parse_queries(json).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].model_name, "CamX.*");
        assert_eq!(queries[0].endpoints, vec!["stream1", "stream2"]);
        assert!(queries[0].manufacturer.is_empty());
        assert_eq!(queries[1].network, "eth0");
        assert!(queries[1].endpoints.is_empty());
    }

    #[test]
    fn test_parse_queries_rejects_object() {
        assert!(parse_queries(r#"{"model_name": "x"}"#).is_err());
    }

    #[tokio::test]
    async fn test_load_queries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"serial_number": "SN-1"}}]"#).unwrap();

        let queries = load_queries(file.path()).await.unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].serial_number, "SN-1");
    }

    #[tokio::test]
    async fn test_load_queries_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_queries(dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(QueryFileError::Io(_))));
    }

    #[test]
    fn test_display_only_set_fields() {
        let query = DeviceQuery {
            model_name: "CamX.*".to_string(),
            endpoints: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        assert_eq!(query.to_string(), "{model_name=CamX.* endpoints=[a,b]}");
        assert_eq!(DeviceQuery::default().to_string(), "{}");
    }
}
