//! Error types for the upnp-find CLI.
//!
//! CliError wraps the core errors and adds CLI-specific variants.

use thiserror::Error;
use upnp_find_core::{DiscoveryError, FindError, QueryFileError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const NO_MATCH: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Find(#[from] FindError),

    #[error("Query file error: {0}")]
    Queries(#[from] QueryFileError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No devices found")]
    NoDevicesFound,

    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Find(e) => match e {
                FindError::NoMatch { .. } => exit_codes::NO_MATCH,
                FindError::Discovery(DiscoveryError::InvalidNetwork(_))
                | FindError::Discovery(DiscoveryError::InterfaceUnsupported(_)) => {
                    exit_codes::INVALID_ARGS
                }
                FindError::Discovery(_) => exit_codes::NETWORK_ERROR,
                FindError::HttpClient(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Queries(_) => exit_codes::INVALID_ARGS,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::NoDevicesFound => exit_codes::NO_MATCH,
            CliError::Timeout(_) => exit_codes::NETWORK_ERROR,
            CliError::Interrupted => exit_codes::GENERAL_ERROR,
        }
    }
}

impl From<DiscoveryError> for CliError {
    fn from(e: DiscoveryError) -> Self {
        CliError::Find(FindError::Discovery(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
