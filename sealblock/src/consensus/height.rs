use serde::{Deserialize, Serialize};
use std::fmt;

/// Height of a `Block` in the chain.
///
/// The genesis block has height `0`, every accepted block is exactly one above its predecessor.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Height(u64);

impl Height {
    /// The height of the genesis block.
    pub const GENESIS: Self = Self(0);

    /// Create a `Height` from a raw block count.
    #[must_use]
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// The height of the block following a block at this height.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for Height {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl From<Height> for u64 {
    fn from(v: Height) -> Self {
        v.0
    }
}
