//! Host resolution: discover, match, and aggregate hostnames.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};
use url::{Host, Url};

use crate::config::FinderConfig;
use crate::discovery::{DeviceSource, Enumerator, UpnpDevice};
use crate::error::{DiscoveryError, FindError, Result};
use crate::query::{parse_networks, DeviceQuery};

/// Hosts that satisfied a query batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostMatches {
    /// Distinct result entries in discovery order: bare hostnames, or
    /// `hostname/endpoint` for queries that name endpoints.
    pub hostnames: Vec<String>,
    /// First query that matched each bare hostname.
    pub queries: BTreeMap<String, DeviceQuery>,
}

impl HostMatches {
    pub fn is_empty(&self) -> bool {
        self.hostnames.is_empty()
    }

    fn push(&mut self, entry: String) {
        if !self.hostnames.contains(&entry) {
            self.hostnames.push(entry);
        }
    }
}

/// Host part of a description location, without scheme, port, path or
/// IPv6 brackets. `None` if the location is not an absolute URL with a host.
/// Domain names keep the case they were advertised with.
pub fn location_hostname(location: &str) -> Option<String> {
    let url = Url::parse(location).ok()?;
    match url.host()? {
        Host::Ipv6(addr) => Some(addr.to_string()),
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Domain(domain) => {
            let raw = raw_host(location).filter(|raw| raw.eq_ignore_ascii_case(domain));
            Some(raw.unwrap_or(domain).to_string())
        }
    }
}

/// Host as written in `location`; `Url` lower-cases domains.
fn raw_host(location: &str) -> Option<&str> {
    let (_, rest) = location.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host_port.split(':').next()
}

/// Match every device against every query and aggregate the results.
pub fn collect_matches(devices: &[UpnpDevice], queries: &[DeviceQuery]) -> HostMatches {
    let mut result = HostMatches::default();

    for device in devices {
        let matched: Vec<&DeviceQuery> = queries.iter().filter(|q| device.matches(q)).collect();
        if matched.is_empty() {
            continue;
        }

        let Some(host) = location_hostname(&device.service.location) else {
            warn!("invalid location {}", device.service.location);
            continue;
        };

        for query in matched {
            result
                .queries
                .entry(host.clone())
                .or_insert_with(|| query.clone());

            if query.endpoints.is_empty() {
                result.push(host.clone());
            } else {
                for endpoint in &query.endpoints {
                    result.push(format!("{}/{}", host, endpoint));
                }
            }
        }
    }

    result
}

/// Resolves query batches to hostnames.
pub struct HostFinder {
    source: Box<dyn DeviceSource>,
}

impl HostFinder {
    pub fn new(source: Box<dyn DeviceSource>) -> Self {
        Self { source }
    }

    /// A finder backed by SSDP and HTTP.
    pub fn upnp(config: FinderConfig) -> Result<Self> {
        Ok(Self::new(Box::new(Enumerator::upnp(config)?)))
    }

    /// Every resolved device on `networks`, unfiltered.
    pub async fn devices(
        &self,
        networks: &[String],
        root_only: bool,
    ) -> std::result::Result<Vec<UpnpDevice>, DiscoveryError> {
        self.source.find_all(networks, root_only).await
    }

    /// Hosts matching at least one query; see [`HostFinder::find_host_matches`].
    pub async fn find_hosts(
        &self,
        queries: &[DeviceQuery],
        root_only: bool,
    ) -> Result<Vec<String>> {
        Ok(self.find_host_matches(queries, root_only).await?.hostnames)
    }

    /// Search every distinct network named by the batch, then match each
    /// device against each query.
    ///
    /// Fails with [`FindError::NoMatch`] when nothing matched and with
    /// [`FindError::Discovery`] when any search failed.
    pub async fn find_host_matches(
        &self,
        queries: &[DeviceQuery],
        root_only: bool,
    ) -> Result<HostMatches> {
        let networks = parse_networks(queries);
        debug!("searching networks {:?}", networks);

        let all = self.devices(&networks, root_only).await?;
        let matches = collect_matches(&all, queries);

        if matches.is_empty() {
            return Err(FindError::NoMatch {
                queries: queries.to_vec(),
            });
        }

        Ok(matches)
    }
}

/// Find hosts with the default SSDP/HTTP settings.
pub async fn find_host(queries: &[DeviceQuery], root_only: bool) -> Result<Vec<String>> {
    HostFinder::upnp(FinderConfig::default())?
        .find_hosts(queries, root_only)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{Advertisement, DeviceDesc, DeviceInfo, SpecVersion, StaticDevices};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    fn make_device(location: &str, manufacturer: &str, model: &str) -> UpnpDevice {
        UpnpDevice {
            service: Advertisement::new("upnp:rootdevice", location),
            desc: DeviceDesc {
                spec_version: SpecVersion { major: 1, minor: 0 },
                device: DeviceInfo {
                    manufacturer: manufacturer.to_string(),
                    model_name: model.to_string(),
                    serial_number: String::new(),
                },
            },
        }
    }

    fn finder(devices: Vec<UpnpDevice>) -> HostFinder {
        HostFinder::new(Box::new(StaticDevices(devices)))
    }

    fn model_query(model: &str) -> DeviceQuery {
        DeviceQuery {
            model_name: model.to_string(),
            ..Default::default()
        }
    }

    /// Records the networks it was asked to search.
    struct RecordingSource {
        networks: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl DeviceSource for RecordingSource {
        async fn find_all(
            &self,
            networks: &[String],
            _root_only: bool,
        ) -> std::result::Result<Vec<UpnpDevice>, DiscoveryError> {
            self.networks.lock().unwrap().extend(networks.iter().cloned());
            Ok(vec![make_device("http://10.0.0.5/d.xml", "Acme", "CamX200")])
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DeviceSource for FailingSource {
        async fn find_all(
            &self,
            networks: &[String],
            _root_only: bool,
        ) -> std::result::Result<Vec<UpnpDevice>, DiscoveryError> {
            Err(DiscoveryError::InvalidNetwork(networks.join(",")))
        }
    }

    #[test]
    fn test_location_hostname() {
        assert_eq!(
            location_hostname("http://10.0.0.5:80/desc.xml").as_deref(),
            Some("10.0.0.5")
        );
        assert_eq!(
            location_hostname("http://cam1.local:49152/rootDesc.xml").as_deref(),
            Some("cam1.local")
        );
        assert_eq!(
            location_hostname("http://[fe80::1]:80/d.xml").as_deref(),
            Some("fe80::1")
        );
        assert_eq!(
            location_hostname("http://CAM1.Local:80/d.xml").as_deref(),
            Some("CAM1.Local")
        );
        assert_eq!(
            location_hostname("http://admin@Cam2:8080/d.xml").as_deref(),
            Some("Cam2")
        );
        assert_eq!(location_hostname("desc.xml"), None);
        assert_eq!(location_hostname("http://"), None);
    }

    #[tokio::test]
    async fn test_model_prefix_resolves_host() {
        let finder = finder(vec![make_device("http://10.0.0.5:80/desc.xml", "Acme", "CamX200")]);

        let hosts = finder.find_hosts(&[model_query("CamX.*")], false).await.unwrap();
        assert_eq!(hosts, vec!["10.0.0.5"]);
    }

    #[tokio::test]
    async fn test_duplicate_hosts_collapsed() {
        let finder = finder(vec![
            make_device("http://10.0.0.5:80/desc.xml", "Acme", "CamX200"),
            make_device("http://10.0.0.5:49152/other.xml", "Acme", "CamX300"),
            make_device("http://10.0.0.6:80/desc.xml", "Acme", "CamX200"),
        ]);

        let hosts = finder
            .find_hosts(&[model_query("CamX.*"), DeviceQuery::default()], false)
            .await
            .unwrap();
        assert_eq!(hosts, vec!["10.0.0.5", "10.0.0.6"]);
    }

    #[tokio::test]
    async fn test_endpoint_expansion() {
        let finder = finder(vec![make_device("http://cam1:80/desc.xml", "Acme", "CamX200")]);
        let query = DeviceQuery {
            model_name: "CamX200".to_string(),
            endpoints: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };

        let hosts = finder.find_hosts(&[query], false).await.unwrap();
        assert_eq!(hosts, vec!["cam1/a", "cam1/b"]);
        assert!(!hosts.contains(&"cam1".to_string()));
    }

    #[tokio::test]
    async fn test_two_queries_map_to_their_hosts() {
        let finder = finder(vec![
            make_device("http://10.0.0.1/d.xml", "Acme", "Cam"),
            make_device("http://10.0.0.2/d.xml", "Globex", "Cam"),
        ]);
        let acme = DeviceQuery {
            model_name: "Cam".to_string(),
            manufacturer: "Acme".to_string(),
            ..Default::default()
        };
        let globex = DeviceQuery {
            manufacturer: "Globex".to_string(),
            ..acme.clone()
        };

        let matches = finder
            .find_host_matches(&[acme.clone(), globex.clone()], false)
            .await
            .unwrap();

        assert_eq!(matches.hostnames, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(matches.queries.get("10.0.0.1"), Some(&acme));
        assert_eq!(matches.queries.get("10.0.0.2"), Some(&globex));
    }

    #[tokio::test]
    async fn test_first_matching_query_recorded() {
        let finder = finder(vec![make_device("http://10.0.0.1/d.xml", "Acme", "CamX200")]);
        let first = model_query("CamX.*");
        let second = model_query("CamX200");

        let matches = finder
            .find_host_matches(&[first.clone(), second], false)
            .await
            .unwrap();
        assert_eq!(matches.hostnames, vec!["10.0.0.1"]);
        assert_eq!(matches.queries.len(), 1);
        assert_eq!(matches.queries.get("10.0.0.1"), Some(&first));
    }

    #[tokio::test]
    async fn test_no_match_lists_queries() {
        let finder = finder(vec![make_device("http://10.0.0.1/d.xml", "Acme", "CamX200")]);
        let queries = vec![model_query("Doorbell.*")];

        let err = finder.find_hosts(&queries, false).await.unwrap_err();
        match &err {
            FindError::NoMatch { queries: unmatched } => assert_eq!(unmatched, &queries),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("model_name=Doorbell.*"));
    }

    #[tokio::test]
    async fn test_no_devices_is_no_match() {
        let err = finder(Vec::new())
            .find_hosts(&[DeviceQuery::default()], true)
            .await
            .unwrap_err();
        assert!(matches!(err, FindError::NoMatch { .. }));
    }

    #[tokio::test]
    async fn test_invalid_location_skipped() {
        let finder = finder(vec![
            make_device("not a url", "Acme", "CamX200"),
            make_device("http://10.0.0.7/d.xml", "Acme", "CamX200"),
        ]);

        let hosts = finder.find_hosts(&[model_query("CamX200")], false).await.unwrap();
        assert_eq!(hosts, vec!["10.0.0.7"]);
    }

    #[tokio::test]
    async fn test_networks_searched_once_each() {
        let networks = Arc::new(Mutex::new(Vec::new()));
        let finder = HostFinder::new(Box::new(RecordingSource {
            networks: networks.clone(),
        }));
        let on = |n: &str| DeviceQuery {
            network: n.to_string(),
            ..Default::default()
        };

        finder
            .find_hosts(&[on("eth0"), on("eth0"), on("wlan0"), on("")], false)
            .await
            .unwrap();
        assert_eq!(*networks.lock().unwrap(), vec!["eth0", "wlan0"]);
    }

    #[tokio::test]
    async fn test_discovery_error_propagates() {
        let finder = HostFinder::new(Box::new(FailingSource));
        let query = DeviceQuery {
            network: "eth0".to_string(),
            ..Default::default()
        };

        let err = finder.find_host_matches(&[query], false).await.unwrap_err();
        assert!(matches!(err, FindError::Discovery(_)));
    }
}
