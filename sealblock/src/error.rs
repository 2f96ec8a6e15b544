use crate::{
    consensus::{genesis::LoadError, Seal},
    BoxError,
};
use err_derive::Error;

/// An error of the block construction pipeline.
///
/// Every variant is terminal for a single construction attempt:
/// either a fully sealed and persisted block is returned or none is.
#[derive(Debug, Error)]
pub enum Error {
    /// The genesis configuration could not be loaded or is inconsistent.
    #[error(display = "Could not set genesis config from {}: {}", path, reason)]
    SetConfig {
        /// The path the configuration was loaded from.
        path: String,
        /// Why loading the configuration failed.
        reason: LoadError,
    },

    /// The transaction seal could not be built.
    #[error(display = "Could not build tx seal: {}", 0)]
    BuildingTxSeal(TxSealCause),

    /// The seal could not be built because an anchor field is empty.
    #[error(display = "Could not build seal: {} is empty.", 0)]
    BuildingSeal(SealAnchor),

    /// The repository failed to load or save events.
    #[error(display = "{}", 0)]
    Persistence(BoxError),

    /// A stored block does not hash to the seal it is stored under.
    #[error(display = "Block {} does not match its content (computed {}).", seal, computed)]
    SealMismatch {
        /// The seal the block is stored under.
        seal: Seal,
        /// The seal computed from the stored content.
        computed: Seal,
    },
}

/// The reason a `TxSeal` could not be built.
#[derive(Debug, Error)]
pub enum TxSealCause {
    /// No transactions were given.
    #[error(display = "the transaction list is empty")]
    EmptyTxList,

    /// A transaction could not produce its digest data.
    #[error(display = "transaction #{} could not be digested: {}", index, error)]
    Undigestable {
        /// Position of the transaction in the list.
        index: usize,
        /// The error reported by the transaction.
        error: BoxError,
    },
}

/// The fields a proposed block is anchored by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealAnchor {
    /// The seal of the previous block.
    PrevSeal,
    /// The identity of the proposing node.
    Creator,
}

impl std::fmt::Display for SealAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::PrevSeal => f.write_str("prev seal"),
            Self::Creator => f.write_str("creator"),
        }
    }
}
