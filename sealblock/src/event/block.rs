use super::{AggregateId, EventModel};
use crate::consensus::{DefaultBlock, Height, Seal, TxSeal};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// The only event emitted when a block is created.
///
/// It carries the full block state. The block's `Seal` is the event's aggregate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCreatedEvent<T> {
    /// The event's metadata.
    pub model: EventModel,
    /// The seal of the previous block.
    pub prev_seal: Seal,
    /// The block's height.
    pub height: Height,
    /// The block's transactions.
    pub tx_list: Vec<T>,
    /// The block's transaction digests.
    pub tx_seal: TxSeal,
    /// The block's rounded creation time.
    pub timestamp: SystemTime,
    /// The proposing node.
    pub creator: Vec<u8>,
}

impl<T> From<&DefaultBlock<T>> for BlockCreatedEvent<T>
where
    T: Clone,
{
    fn from(block: &DefaultBlock<T>) -> Self {
        Self {
            model: EventModel::new(AggregateId::from(&block.seal)),
            prev_seal: block.prev_seal.clone(),
            height: block.height,
            tx_list: block.tx_list.clone(),
            tx_seal: block.tx_seal.clone(),
            timestamp: block.timestamp,
            creator: block.creator.clone(),
        }
    }
}
