//! Find UPnP devices (cameras and the like) by what they say they are.
//!
//! A discovery pass sends an SSDP search on each network named by a query
//! batch, fetches the description document of every advertisement, and keeps
//! the hosts whose model name, manufacturer and serial number satisfy at least
//! one query.
//!
//! ```no_run
//! use upnp_find_core::{find_host, DeviceQuery};
//!
//! # async fn run() -> Result<(), upnp_find_core::FindError> {
//! let queries = vec![DeviceQuery {
//!     model_name: "CamX.*".to_string(),
//!     ..Default::default()
//! }];
//! let hosts = find_host(&queries, true).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod finder;
pub mod matcher;
pub mod query;

pub use config::FinderConfig;
pub use discovery::{
    Advertisement, DescriptionSource, DeviceDesc, DeviceSource, Discover, Enumerator, SearchMode,
    StaticDevices, UpnpDevice,
};
pub use error::{DescriptionError, DiscoveryError, FindError, QueryFileError};
pub use finder::{find_host, HostFinder, HostMatches};
pub use matcher::pattern_matches;
pub use query::{load_queries, parse_networks, DeviceQuery};
