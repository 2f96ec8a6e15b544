//! Schema and loading of the genesis configuration file.

use super::{Height, Seal, TxSeal};
use chrono::{DateTime, FixedOffset};
use err_derive::Error;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs, io, path::Path};

/// An error while loading a `GenesisConfig`.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error(display = "{}", 0)]
    Io(#[error(from)] io::Error),

    /// The file does not contain a valid genesis configuration.
    #[error(display = "{}", 0)]
    Json(#[error(from)] serde_json::Error),

    /// The configured `TxSeal` is not the digest of the configured `TxList`.
    #[error(display = "TxSeal does not match TxList")]
    TxSealMismatch,
}

/// The content of the genesis configuration file.
///
/// ```
/// use sealblock::consensus::{DefaultTransaction, GenesisConfig};
///
/// let config: GenesisConfig<DefaultTransaction> = GenesisConfig::from_json(r#"{
///     "Seal": [],
///     "PrevSeal": [],
///     "Height": 0,
///     "TxList": [],
///     "TxSeal": [],
///     "TimeStamp": "0001-01-01T00:00:00-00:00",
///     "Creator": []
/// }"#).unwrap();
///
/// assert!(config.prev_seal.is_empty());
/// assert!(config.tx_list.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenesisConfig<T> {
    /// Ignored: the seal of the genesis block is always recomputed.
    pub seal: Seal,
    /// The previous seal of the genesis block, normally empty.
    pub prev_seal: Seal,
    /// The height of the genesis block, normally `0`.
    pub height: Height,
    /// Transactions included in the genesis block.
    pub tx_list: Vec<T>,
    /// The transaction seal of the genesis block.
    ///
    /// It is derived from `tx_list`; a non-empty value must match the derived one.
    pub tx_seal: TxSeal,
    /// The time of the configuration; the block itself is stamped with its creation time.
    pub time_stamp: DateTime<FixedOffset>,
    /// The creator of the genesis block, normally empty.
    pub creator: Vec<u8>,
}

impl<T> GenesisConfig<T>
where
    T: DeserializeOwned,
{
    /// Load the configuration from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse the configuration from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(data)?)
    }
}
