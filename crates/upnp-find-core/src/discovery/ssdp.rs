//! SSDP M-SEARCH over UDP multicast.
//!
//! One search sends a single M-SEARCH and collects unicast responses until the
//! window closes. Binding follows the network identifier: a local IPv4 address
//! (optionally `ip:port`) or, on Linux, an interface name.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::error::DiscoveryError;

use super::{Advertisement, Discover, SearchMode};

/// SSDP multicast group and port
pub const SSDP_MULTICAST_ADDR: SocketAddrV4 =
    SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900);

const SSDP_TTL: u32 = 2;

/// Linux IFNAMSIZ minus the trailing NUL
const MAX_INTERFACE_NAME: usize = 15;

/// Where a search socket is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkTarget {
    /// Bind to a local address and send multicast from it.
    Address(SocketAddrV4),
    /// Bind to a named interface (SO_BINDTODEVICE).
    Interface(String),
}

/// Interpret a network identifier.
pub fn parse_network(network: &str) -> Result<NetworkTarget, DiscoveryError> {
    if let Ok(addr) = network.parse::<SocketAddrV4>() {
        return Ok(NetworkTarget::Address(addr));
    }
    if let Ok(ip) = network.parse::<Ipv4Addr>() {
        return Ok(NetworkTarget::Address(SocketAddrV4::new(ip, 0)));
    }

    let valid_name = !network.is_empty()
        && network.len() <= MAX_INTERFACE_NAME
        && network
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    // A colon means an address that failed to parse (IPv6 or a bad port).
    if !valid_name || network.contains(':') {
        return Err(DiscoveryError::InvalidNetwork(network.to_string()));
    }

    Ok(NetworkTarget::Interface(network.to_string()))
}

/// Build the M-SEARCH request for `mode`.
///
/// `MX` is the window in whole seconds, at least 1.
pub fn build_search_request(mode: SearchMode, window: Duration) -> String {
    let mx = window.as_secs().max(1);
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\r\n",
        SSDP_MULTICAST_ADDR,
        mx,
        mode.search_target()
    )
}

/// Parse one M-SEARCH response. Returns `None` for anything that is not an
/// HTTP response carrying a `LOCATION`.
pub fn parse_search_response(data: &[u8]) -> Option<Advertisement> {
    let text = String::from_utf8_lossy(data);
    let mut lines = text.lines();

    let status_line = lines.next()?.trim();
    if !status_line.starts_with("HTTP/") {
        return None;
    }

    let mut headers = BTreeMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_uppercase(), value.trim().to_string());
        }
    }

    let location = headers.get("LOCATION").filter(|l| !l.is_empty())?.clone();
    let header = |name: &str| headers.get(name).cloned().unwrap_or_default();

    Some(Advertisement {
        search_type: header("ST"),
        location,
        usn: header("USN"),
        server: header("SERVER"),
        max_age: headers.get("CACHE-CONTROL").and_then(|v| parse_max_age(v)),
        headers,
    })
}

fn parse_max_age(cache_control: &str) -> Option<u32> {
    cache_control.split(',').find_map(|directive| {
        let (key, value) = directive.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("max-age") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Create the non-blocking search socket for `network`.
pub fn create_search_socket(network: Option<&str>) -> Result<std::net::UdpSocket, DiscoveryError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_multicast_ttl_v4(SSDP_TTL)?;

    let any: SocketAddr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0).into();
    match network.map(parse_network).transpose()? {
        None => socket.bind(&any.into())?,
        Some(NetworkTarget::Address(addr)) => {
            socket.set_multicast_if_v4(addr.ip())?;
            socket.bind(&SocketAddr::from(addr).into())?;
        }
        Some(NetworkTarget::Interface(name)) => {
            bind_to_interface(&socket, &name)?;
            socket.bind(&any.into())?;
        }
    }

    socket.set_nonblocking(true)?;
    Ok(socket.into())
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "fuchsia"))]
fn bind_to_interface(socket: &Socket, name: &str) -> Result<(), DiscoveryError> {
    socket.bind_device(Some(name.as_bytes()))?;
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "fuchsia")))]
fn bind_to_interface(_socket: &Socket, name: &str) -> Result<(), DiscoveryError> {
    Err(DiscoveryError::InterfaceUnsupported(name.to_string()))
}

/// SSDP search over the host's network stack.
#[derive(Debug, Default, Clone)]
pub struct SsdpSearcher;

impl SsdpSearcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Discover for SsdpSearcher {
    async fn search(
        &self,
        mode: SearchMode,
        window: Duration,
        network: Option<&str>,
    ) -> Result<Vec<Advertisement>, DiscoveryError> {
        let socket = UdpSocket::from_std(create_search_socket(network)?)?;

        let request = build_search_request(mode, window);
        socket
            .send_to(request.as_bytes(), SocketAddr::from(SSDP_MULTICAST_ADDR))
            .await?;

        let deadline = Instant::now() + window;
        let mut found = Vec::new();
        let mut buf = vec![0u8; 8192];

        loop {
            match timeout_at(deadline, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, addr))) => match parse_search_response(&buf[..len]) {
                    Some(ad) if mode.accepts(&ad) => found.push(ad),
                    Some(ad) => debug!("ignoring {} from {} for {:?}", ad.search_type, addr, mode),
                    None => debug!("ignoring non-SSDP datagram from {}", addr),
                },
                Ok(Err(e)) => {
                    warn!("SSDP receive error: {}", e);
                }
                Err(_) => break,
            }
        }

        Ok(found)
    }
}
