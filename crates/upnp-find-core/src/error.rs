//! Error types for upnp-find core.

use thiserror::Error;

use crate::query::DeviceQuery;

/// Errors from the SSDP discovery layer.
///
/// Any of these aborts the whole enumeration.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("SSDP socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid network '{0}': expected a local address or an interface name")]
    InvalidNetwork(String),

    #[error("Binding to interface '{0}' is not supported on this platform")]
    InterfaceUnsupported(String),
}

/// Errors fetching or decoding a device description.
///
/// These are local to one device; the enumerator logs them and drops the device.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("can't fetch xml({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http fetch ({url}) not ok: {status}")]
    Status { url: String, status: u16 },

    #[error("can't read body from ({url}): {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bad xml from ({url}): {source}")]
    Xml {
        url: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("bad xml from ({url}): expected element <root> but have <{found}>")]
    UnexpectedRoot { url: String, found: String },
}

/// Caller-facing error for host resolution.
#[derive(Debug, Error)]
pub enum FindError {
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("no match found for queries: {}", format_queries(.queries))]
    NoMatch { queries: Vec<DeviceQuery> },
}

/// Errors loading a query batch from disk.
#[derive(Debug, Error)]
pub enum QueryFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse queries: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_queries(queries: &[DeviceQuery]) -> String {
    let parts: Vec<String> = queries.iter().map(|q| q.to_string()).collect();
    format!("[{}]", parts.join(" "))
}

/// Result type for host resolution
pub type Result<T> = std::result::Result<T, FindError>;
