//! Device description retrieval.
//!
//! Fetches the XML document a device advertises at its SSDP `LOCATION` and
//! decodes the fields used for matching.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::DescriptionError;

use super::DescriptionSource;

/// UPnP `<specVersion>` of a description document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecVersion {
    pub major: i32,
    pub minor: i32,
}

/// The `<device>` element fields used for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model_name: String,
    pub serial_number: String,
}

/// A decoded device description document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceDesc {
    pub spec_version: SpecVersion,
    pub device: DeviceInfo,
}

/// Decode a description document fetched from `url`.
///
/// The document element must be `<root>`; unknown elements are ignored and
/// missing fields decode as empty. The `<device>` strings keep their
/// surrounding whitespace.
pub fn parse_device_desc(url: &str, data: &[u8]) -> Result<DeviceDesc, DescriptionError> {
    check_root_element(url, data)?;

    let mut desc: DeviceDesc =
        quick_xml::de::from_reader(data).map_err(|source| DescriptionError::Xml {
            url: url.to_string(),
            source,
        })?;
    read_device_text(url, data, &mut desc.device)?;
    Ok(desc)
}

/// Re-read `root/device/{manufacturer,modelName,serialNumber}` as raw
/// character data; the deserializer trims text content.
fn read_device_text(
    url: &str,
    data: &[u8],
    info: &mut DeviceInfo,
) -> Result<(), DescriptionError> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                path.push(e.local_name().as_ref().to_vec());
                if path.len() == 3 {
                    text.clear();
                }
            }
            Ok(Event::Text(t)) if path.len() == 3 => {
                let unescaped = t.unescape().map_err(|e| DescriptionError::Xml {
                    url: url.to_string(),
                    source: e.into(),
                })?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(c)) if path.len() == 3 => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Ok(Event::End(_)) => {
                if path.len() == 3 && path[0] == b"root" && path[1] == b"device" {
                    let value = std::mem::take(&mut text);
                    match path[2].as_slice() {
                        b"manufacturer" => info.manufacturer = value,
                        b"modelName" => info.model_name = value,
                        b"serialNumber" => info.serial_number = value,
                        _ => {}
                    }
                }
                path.pop();
            }
            Ok(Event::Eof) => return Ok(()),
            Err(source) => {
                return Err(DescriptionError::Xml {
                    url: url.to_string(),
                    source: source.into(),
                });
            }
            Ok(_) => {}
        }
        buf.clear();
    }
}

fn check_root_element(url: &str, data: &[u8]) -> Result<(), DescriptionError> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"root" {
                    return Ok(());
                }
                return Err(DescriptionError::UnexpectedRoot {
                    url: url.to_string(),
                    found: String::from_utf8_lossy(name.as_ref()).to_string(),
                });
            }
            // Let the deserializer report empty or broken documents.
            Ok(Event::Eof) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
        buf.clear();
    }
}

/// Fetches descriptions over HTTP.
pub struct HttpDescriptionSource {
    client: Client,
}

impl HttpDescriptionSource {
    /// Create a source whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Single GET of `url`; no retry.
    pub async fn fetch_raw(&self, url: &str) -> Result<Bytes, DescriptionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DescriptionError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DescriptionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|source| DescriptionError::Body {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl DescriptionSource for HttpDescriptionSource {
    async fn fetch(&self, url: &str) -> Result<DeviceDesc, DescriptionError> {
        let data = self.fetch_raw(url).await?;
        parse_device_desc(url, &data)
    }
}
