//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{WebServerError, WebServerResult};

/// Version of the persisted layout; a mismatch wipes and reseeds the store
pub const SCHEMA_VERSION: u64 = 1;

/// Default pairing endpoint of the public oracle
pub const DEFAULT_ORACLE_URL: &str = "https://neal.fun/api/infinite-craft/pair";

/// Where combinations come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleSource {
    /// Remote HTTP oracle
    Http { url: String, timeout: Duration },
    /// Offline recipe book loaded from a JSON file
    RecipeBook { path: PathBuf },
}

/// Fully resolved configuration for one server process
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub db_path: PathBuf,
    pub oracle: OracleSource,
    /// Per-session queue of outbound messages
    pub outbound_capacity: usize,
}

impl ServerConfig {
    pub fn validate(&self) -> WebServerResult<()> {
        if self.outbound_capacity == 0 {
            return Err(WebServerError::config("outbound capacity must be greater than zero"));
        }
        match &self.oracle {
            OracleSource::Http { url, timeout } => {
                if timeout.is_zero() {
                    return Err(WebServerError::config("oracle timeout must be greater than zero"));
                }
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(WebServerError::config(format!("oracle url must be http(s): {url}")));
                }
            }
            OracleSource::RecipeBook { path } => {
                if path.as_os_str().is_empty() {
                    return Err(WebServerError::config("recipe book path is empty"));
                }
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            db_path: PathBuf::from("./data/elements.redb"),
            oracle: OracleSource::Http {
                url: DEFAULT_ORACLE_URL.to_string(),
                timeout: Duration::from_secs(10),
            },
            outbound_capacity: 100,
        }
    }
}
