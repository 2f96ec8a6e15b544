use super::{Height, Seal, Transaction, TxSeal};
use crate::event::BlockCreatedEvent;
use serde::Serialize;
use std::time::SystemTime;

/// A `Block` stores sealed transactions of the ledger.
///
/// Blocks are read-only once they are sealed: there are only accessors.
pub trait Block {
    /// The type of the contained transactions.
    type Transaction: Transaction;

    /// The seal of the previous block (empty for the genesis block).
    fn prev_seal(&self) -> &Seal;

    /// The position of the block in the chain.
    fn height(&self) -> Height;

    /// The sealed transactions in order.
    fn tx_list(&self) -> &[Self::Transaction];

    /// The digests of the transactions in order.
    fn tx_seal(&self) -> &TxSeal;

    /// The rounded creation time.
    fn timestamp(&self) -> SystemTime;

    /// The identity of the proposing node (empty for the genesis block).
    fn creator(&self) -> &[u8];

    /// The content digest of this block.
    fn seal(&self) -> &Seal;
}

/// The canonical `Block`.
///
/// Only the `BlockFactory` and event replay can assemble a `DefaultBlock`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultBlock<T> {
    pub(crate) seal: Seal,
    pub(crate) prev_seal: Seal,
    pub(crate) height: Height,
    pub(crate) tx_list: Vec<T>,
    pub(crate) tx_seal: TxSeal,
    pub(crate) timestamp: SystemTime,
    pub(crate) creator: Vec<u8>,
}

impl<T> Block for DefaultBlock<T>
where
    T: Transaction,
{
    type Transaction = T;

    fn prev_seal(&self) -> &Seal {
        &self.prev_seal
    }

    fn height(&self) -> Height {
        self.height
    }

    fn tx_list(&self) -> &[T] {
        &self.tx_list
    }

    fn tx_seal(&self) -> &TxSeal {
        &self.tx_seal
    }

    fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    fn creator(&self) -> &[u8] {
        &self.creator
    }

    fn seal(&self) -> &Seal {
        &self.seal
    }
}

impl<T> DefaultBlock<T> {
    /// Rebuild the block sealed with `seal` from its creation event.
    ///
    /// The caller must check that the content still matches `seal`.
    pub(crate) fn from_event(seal: Seal, event: BlockCreatedEvent<T>) -> Self {
        Self {
            seal,
            prev_seal: event.prev_seal,
            height: event.height,
            tx_list: event.tx_list,
            tx_seal: event.tx_seal,
            timestamp: event.timestamp,
            creator: event.creator,
        }
    }
}
