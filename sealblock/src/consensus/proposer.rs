use super::{Block, BlockFactory, DefaultBlock, Height, Seal, Transaction, Validator};
use crate::{event::BlockCreatedEvent, event_store::Repository, txpool::BlockProposer, BoxError};
use std::sync::{Arc, Mutex, PoisonError};

/// The seal and height of the newest block.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChainTip {
    seal: Seal,
    height: Height,
}

/// Creates blocks on top of the newest block created by this node.
///
/// Only the leader proposes, so the chain tip is tracked locally.
pub struct Proposer<V, R> {
    factory: Arc<BlockFactory<V, R>>,
    creator: Vec<u8>,
    tip: Mutex<ChainTip>,
}

impl<V, R> Proposer<V, R>
where
    V: Validator + Sync,
{
    /// Create a `Proposer` extending the chain starting at `genesis`.
    ///
    /// Blocks are marked with `creator` as their proposing node.
    pub fn new<B>(factory: Arc<BlockFactory<V, R>>, creator: Vec<u8>, genesis: &B) -> Self
    where
        B: Block,
    {
        Self {
            factory,
            creator,
            tip: Mutex::new(ChainTip {
                seal: genesis.seal().clone(),
                height: genesis.height(),
            }),
        }
    }

    /// The height of the newest block.
    pub fn height(&self) -> Height {
        self.tip.lock().unwrap_or_else(PoisonError::into_inner).height
    }

    /// The seal of the newest block.
    pub fn seal(&self) -> Seal {
        self.tip
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .seal
            .clone()
    }

    /// Seal `transactions` into the next block.
    ///
    /// The chain tip is only advanced if the block was created and persisted.
    pub fn propose_block<T>(&self, transactions: Vec<T>) -> Result<DefaultBlock<T>, BoxError>
    where
        T: Transaction,
        R: Repository<BlockCreatedEvent<T>>,
    {
        let mut tip = self.tip.lock().unwrap_or_else(PoisonError::into_inner);
        let height = tip
            .height
            .next()
            .ok_or("The chain reached its maximum height.")?;

        let block = self.factory.create_proposed_block(
            tip.seal.clone(),
            height,
            transactions,
            self.creator.clone(),
        )?;

        *tip = ChainTip {
            seal: block.seal.clone(),
            height,
        };
        Ok(block)
    }
}

impl<T, V, R> BlockProposer<T> for Proposer<V, R>
where
    T: Transaction,
    V: Validator + Send + Sync,
    R: Repository<BlockCreatedEvent<T>> + Send + Sync,
{
    fn propose(&self, transactions: Vec<T>) -> Result<Height, BoxError> {
        let block = self.propose_block(transactions)?;
        Ok(block.height)
    }
}
