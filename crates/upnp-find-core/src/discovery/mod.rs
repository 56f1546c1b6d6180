//! UPnP device discovery.
//!
//! An [`Enumerator`] runs one SSDP search per network through a [`Discover`]
//! implementation and resolves every advertisement into a [`UpnpDevice`] via a
//! [`DescriptionSource`]. Both seams are traits so tests can substitute fakes.

pub mod description;
pub mod ssdp;

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FinderConfig;
use crate::error::{DescriptionError, DiscoveryError};

pub use description::{
    parse_device_desc, DeviceDesc, DeviceInfo, HttpDescriptionSource, SpecVersion,
};
pub use ssdp::SsdpSearcher;

/// Which advertisements an SSDP search asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Every service and embedded device (`ssdp:all`).
    All,
    /// Root devices only (`upnp:rootdevice`), far fewer descriptions to fetch.
    RootDevice,
}

impl SearchMode {
    pub fn from_root_only(root_only: bool) -> Self {
        if root_only {
            SearchMode::RootDevice
        } else {
            SearchMode::All
        }
    }

    /// The `ST` header value.
    pub fn search_target(&self) -> &'static str {
        match self {
            SearchMode::All => "ssdp:all",
            SearchMode::RootDevice => "upnp:rootdevice",
        }
    }

    /// Whether a response belongs to this search.
    pub fn accepts(&self, ad: &Advertisement) -> bool {
        match self {
            SearchMode::All => true,
            SearchMode::RootDevice => ad.search_type == self.search_target(),
        }
    }
}

/// One SSDP search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    /// `ST` header
    pub search_type: String,
    /// `LOCATION` header, the description URL
    pub location: String,
    pub usn: String,
    pub server: String,
    pub max_age: Option<u32>,
    /// All headers, names upper-cased
    pub headers: BTreeMap<String, String>,
}

impl Advertisement {
    pub fn new(search_type: &str, location: &str) -> Self {
        Self {
            search_type: search_type.to_string(),
            location: location.to_string(),
            ..Default::default()
        }
    }
}

/// An advertisement with its resolved description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpnpDevice {
    pub service: Advertisement,
    pub desc: DeviceDesc,
}

/// The SSDP search collaborator.
#[async_trait]
pub trait Discover: Send + Sync {
    /// Search `network` (the default interface for `None`) for `window`.
    async fn search(
        &self,
        mode: SearchMode,
        window: Duration,
        network: Option<&str>,
    ) -> Result<Vec<Advertisement>, DiscoveryError>;
}

/// The description fetch collaborator.
#[async_trait]
pub trait DescriptionSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DeviceDesc, DescriptionError>;
}

/// Anything that can produce the resolved devices for a set of networks.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn find_all(
        &self,
        networks: &[String],
        root_only: bool,
    ) -> Result<Vec<UpnpDevice>, DiscoveryError>;
}

/// A fixed device list, bypassing the network entirely.
#[derive(Debug, Clone, Default)]
pub struct StaticDevices(pub Vec<UpnpDevice>);

#[async_trait]
impl DeviceSource for StaticDevices {
    async fn find_all(
        &self,
        _networks: &[String],
        _root_only: bool,
    ) -> Result<Vec<UpnpDevice>, DiscoveryError> {
        Ok(self.0.clone())
    }
}

/// Searches each network and resolves the advertisements it returns.
pub struct Enumerator {
    discover: Box<dyn Discover>,
    descriptions: Box<dyn DescriptionSource>,
    config: FinderConfig,
}

impl Enumerator {
    pub fn new(
        discover: Box<dyn Discover>,
        descriptions: Box<dyn DescriptionSource>,
        config: FinderConfig,
    ) -> Self {
        Self {
            discover,
            descriptions,
            config,
        }
    }

    /// SSDP search plus HTTP descriptions with the given settings.
    pub fn upnp(config: FinderConfig) -> Result<Self, reqwest::Error> {
        let descriptions = HttpDescriptionSource::new(config.fetch_timeout)?;
        Ok(Self::new(
            Box::new(SsdpSearcher::new()),
            Box::new(descriptions),
            config,
        ))
    }

    /// Fetch each distinct location once and attach the description to every
    /// advertisement that shares it. Failed locations are logged and dropped.
    async fn resolve(&self, services: Vec<Advertisement>) -> Vec<UpnpDevice> {
        let mut locations: Vec<String> = Vec::new();
        for srv in &services {
            debug!("found service ({}) at {}", srv.search_type, srv.location);
            if !locations.contains(&srv.location) {
                locations.push(srv.location.clone());
            }
        }

        let fetched: Vec<(String, Result<DeviceDesc, DescriptionError>)> = stream::iter(locations)
            .map(|location: String| async move {
                let result = self.descriptions.fetch(&location).await;
                (location, result)
            })
            .buffered(self.config.fetch_concurrency.max(1))
            .collect()
            .await;

        let mut descs: HashMap<String, DeviceDesc> = HashMap::new();
        for (location, result) in fetched {
            match result {
                Ok(desc) => {
                    debug!("got description {:?}", desc);
                    descs.insert(location, desc);
                }
                Err(e) => warn!("cannot read description {}", e),
            }
        }

        services
            .iter()
            .filter_map(|srv| {
                descs.get(&srv.location).map(|desc| UpnpDevice {
                    service: srv.clone(),
                    desc: desc.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl DeviceSource for Enumerator {
    /// One search per network, in order. The first failing search aborts the
    /// whole enumeration. With no networks a single search runs on the
    /// default interface.
    async fn find_all(
        &self,
        networks: &[String],
        root_only: bool,
    ) -> Result<Vec<UpnpDevice>, DiscoveryError> {
        let mode = SearchMode::from_root_only(root_only);
        let targets: Vec<Option<&str>> = if networks.is_empty() {
            vec![None]
        } else {
            networks.iter().map(|n| Some(n.as_str())).collect()
        };

        let mut all = Vec::new();
        for network in targets {
            let list = self
                .discover
                .search(mode, self.config.search_window, network)
                .await?;
            all.extend(self.resolve(list).await);
        }

        debug!("resolved {} device(s)", all.len());
        Ok(all)
    }
}
