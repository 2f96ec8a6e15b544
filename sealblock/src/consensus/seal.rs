use serde::{Deserialize, Serialize};
use std::{fmt, iter::FromIterator, slice};

/// The content digest identifying a `Block`.
///
/// A `Seal` doubles as the aggregate id of the block in the event store.
/// The previous seal of the genesis block is empty.
#[derive(Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seal(Vec<u8>);

impl Seal {
    /// Get a reference to the raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Check whether the seal contains no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode the seal as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Seal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Seal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Vec<u8>> for Seal {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<&[u8]> for Seal {
    fn from(v: &[u8]) -> Self {
        Self(v.to_vec())
    }
}

impl AsRef<[u8]> for Seal {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The ordered list of per-transaction digests of a `Block`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxSeal(Vec<Vec<u8>>);

impl TxSeal {
    /// Get the number of digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the seal contains no digests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the digests in transaction order.
    pub fn iter(&self) -> slice::Iter<'_, Vec<u8>> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a TxSeal {
    type Item = &'a Vec<u8>;
    type IntoIter = slice::Iter<'a, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Vec<u8>> for TxSeal {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self(Vec::from_iter(iter))
    }
}

impl From<Vec<Vec<u8>>> for TxSeal {
    fn from(v: Vec<Vec<u8>>) -> Self {
        Self(v)
    }
}
