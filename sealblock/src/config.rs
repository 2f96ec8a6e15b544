//! The configuration of a node, read from a TOML file.
//!
//! ```toml
//! node_id = "node-1"
//! block_path = "./data/node-1"
//! genesis_path = "./config/genesis.json"
//! timestamp_precision_ms = 100
//! routing_interval_ms = 1000
//! ```

use crate::{node::NodeId, time};
use err_derive::Error;
use serde::Deserialize;
use std::{fs, io, path::Path, time::Duration};

/// Error while loading a `NodeConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error(display = "{}", 0)]
    Io(#[error(from)] io::Error),

    /// The file is no valid configuration.
    #[error(display = "{}", 0)]
    Toml(#[error(from)] toml::de::Error),

    /// A required value is empty.
    #[error(display = "The configuration value {} must not be empty.", 0)]
    Empty(&'static str),
}

/// The settings of a single node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// The identity of this node, also used as creator of its blocks.
    pub node_id: NodeId,
    /// The directory the event store is kept in.
    pub block_path: String,
    /// The genesis block configuration (JSON).
    pub genesis_path: String,
    /// The precision block timestamps are rounded to.
    #[serde(default = "default_timestamp_precision_ms")]
    pub timestamp_precision_ms: u64,
    /// The time after which pooled transactions are routed again.
    #[serde(default = "default_routing_interval_ms")]
    pub routing_interval_ms: u64,
}

#[allow(clippy::cast_possible_truncation)]
const fn default_timestamp_precision_ms() -> u64 {
    time::DEFAULT_TIMESTAMP_PRECISION.as_millis() as u64
}

const fn default_routing_interval_ms() -> u64 {
    1000
}

impl NodeConfig {
    /// Load the configuration from the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_data = fs::read_to_string(path)?;
        Self::from_toml_str(&config_data)
    }

    /// Parse the configuration from TOML.
    pub fn from_toml_str(config_data: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(config_data)?;
        if config.node_id.is_empty() {
            return Err(ConfigError::Empty("node_id"));
        }
        Ok(config)
    }

    /// The precision block timestamps are rounded to.
    #[must_use]
    pub const fn timestamp_precision(&self) -> Duration {
        Duration::from_millis(self.timestamp_precision_ms)
    }

    /// The time after which pooled transactions are routed again.
    #[must_use]
    pub const fn routing_interval(&self) -> Duration {
        Duration::from_millis(self.routing_interval_ms)
    }
}
