use super::{
    genesis::{GenesisConfig, LoadError},
    DefaultBlock, Height, Seal, Transaction, TxSeal, Validator,
};
use crate::{
    event::{Aggregate, AggregateId, BlockCreatedEvent},
    event_store::{Repository, RepositoryError},
    if_monitoring, time, BoxError, Error,
};
use serde::de::DeserializeOwned;
use std::{path::Path, time::Duration};

if_monitoring! {
    use lazy_static::lazy_static;
    use prometheus::{register_int_counter, IntCounter};

    lazy_static! {
        /// Counts the blocks sealed and persisted by this node.
        static ref BLOCKS_CREATED: IntCounter = register_int_counter!(
            "blocks_created",
            "The number of blocks sealed and persisted."
        )
        .unwrap();
    }
}

/// Builds sealed blocks and persists their creation.
///
/// A block is only returned after its `BlockCreatedEvent` was saved,
/// so a caller never observes a block that is not persisted.
pub struct BlockFactory<V, R> {
    validator: V,
    repository: R,
    timestamp_precision: Duration,
}

impl<V, R> BlockFactory<V, R>
where
    V: Validator + Sync,
{
    /// Create a new factory sealing with `validator` and saving into `repository`.
    #[must_use]
    pub fn new(validator: V, repository: R) -> Self {
        Self {
            validator,
            repository,
            timestamp_precision: time::DEFAULT_TIMESTAMP_PRECISION,
        }
    }

    /// Round block timestamps to `precision` instead of the default tenth of a second.
    #[must_use]
    pub fn with_timestamp_precision(mut self, precision: Duration) -> Self {
        self.timestamp_precision = precision;
        self
    }

    /// Get the repository blocks are saved into.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Create the genesis block from the configuration file at `config_path`.
    ///
    /// The `TxSeal` is derived from the configured `TxList`.
    /// A configured `TxSeal` that differs from the derived one is rejected.
    pub fn create_genesis_block<T>(
        &self,
        config_path: impl AsRef<Path>,
    ) -> Result<DefaultBlock<T>, Error>
    where
        T: Transaction + DeserializeOwned,
        R: Repository<BlockCreatedEvent<T>>,
    {
        let config_path = config_path.as_ref();
        let set_config = |reason: LoadError| Error::SetConfig {
            path: config_path.display().to_string(),
            reason,
        };
        let config: GenesisConfig<T> = GenesisConfig::load(config_path).map_err(set_config)?;

        let tx_seal = self.tx_seal_of(&config.tx_list)?;
        if !config.tx_seal.is_empty() && config.tx_seal != tx_seal {
            return Err(set_config(LoadError::TxSealMismatch));
        }

        let timestamp = time::now(self.timestamp_precision);
        let seal = self.validator.compute_seal(
            timestamp,
            &config.prev_seal,
            &tx_seal,
            &config.creator,
        );

        let block = DefaultBlock {
            seal,
            prev_seal: config.prev_seal,
            height: config.height,
            tx_list: config.tx_list,
            tx_seal,
            timestamp,
            creator: config.creator,
        };

        self.persist(&block)?;
        log::info!("Created genesis block {}.", block.seal);
        Ok(block)
    }

    /// Create a block on top of the block sealed with `prev_seal`.
    ///
    /// Fails with `Error::BuildingTxSeal` without transactions and with
    /// `Error::BuildingSeal` without `prev_seal` or `creator`.
    pub fn create_proposed_block<T>(
        &self,
        prev_seal: Seal,
        height: Height,
        tx_list: Vec<T>,
        creator: Vec<u8>,
    ) -> Result<DefaultBlock<T>, Error>
    where
        T: Transaction,
        R: Repository<BlockCreatedEvent<T>>,
    {
        let tx_seal = self.validator.build_tx_seal(&tx_list)?;
        let timestamp = time::now(self.timestamp_precision);
        let seal = self
            .validator
            .build_seal(timestamp, &prev_seal, &tx_seal, &creator)?;

        let block = DefaultBlock {
            seal,
            prev_seal,
            height,
            tx_list,
            tx_seal,
            timestamp,
            creator,
        };

        self.persist(&block)?;
        log::info!(
            "Created block {} at height {} with {} transactions.",
            block.seal,
            block.height,
            block.tx_list.len()
        );
        Ok(block)
    }

    /// Load the block sealed with `seal` from the repository.
    ///
    /// The seal is recomputed from the stored content. A block whose content
    /// does not hash to `seal` fails with `Error::SealMismatch`.
    pub fn load_block<T>(&self, seal: &Seal) -> Result<DefaultBlock<T>, Error>
    where
        T: Transaction,
        R: Repository<BlockCreatedEvent<T>>,
    {
        let aggregate_id = AggregateId::from(seal);
        let mut history = BlockHistory::new(aggregate_id.clone());
        self.repository
            .load(&mut history, &aggregate_id)
            .map_err(Error::Persistence)?;
        let event = history.created.ok_or_else(|| {
            Error::Persistence(RepositoryError::UnknownAggregate(aggregate_id).into())
        })?;

        let tx_seal = self.tx_seal_of(&event.tx_list)?;
        let computed = self.validator.compute_seal(
            event.timestamp,
            &event.prev_seal,
            &tx_seal,
            &event.creator,
        );
        if computed != *seal || tx_seal != event.tx_seal {
            log::warn!("Stored block {} does not match its content.", seal);
            return Err(Error::SealMismatch {
                seal: seal.clone(),
                computed,
            });
        }

        Ok(DefaultBlock::from_event(seal.clone(), event))
    }

    /// The `TxSeal` of `tx_list`, which is empty for an empty list.
    fn tx_seal_of<T>(&self, tx_list: &[T]) -> Result<TxSeal, Error>
    where
        T: Transaction,
    {
        if tx_list.is_empty() {
            Ok(TxSeal::default())
        } else {
            self.validator.build_tx_seal(tx_list)
        }
    }

    fn persist<T>(&self, block: &DefaultBlock<T>) -> Result<(), Error>
    where
        T: Clone,
        R: Repository<BlockCreatedEvent<T>>,
    {
        let event = BlockCreatedEvent::from(block);
        self.repository
            .save(&AggregateId::from(&block.seal), vec![event])
            .map_err(Error::Persistence)?;

        if_monitoring!({
            BLOCKS_CREATED.inc();
        });
        Ok(())
    }
}

/// The event history of a single block.
///
/// A block is created exactly once and never changes afterwards.
struct BlockHistory<T> {
    aggregate_id: AggregateId,
    created: Option<BlockCreatedEvent<T>>,
}

impl<T> BlockHistory<T> {
    const fn new(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id,
            created: None,
        }
    }
}

impl<T> Aggregate for BlockHistory<T> {
    type Event = BlockCreatedEvent<T>;

    fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id.clone()
    }

    fn on(&mut self, event: BlockCreatedEvent<T>) -> Result<(), BoxError> {
        if self.created.is_some() {
            return Err(format!("Block {} was created more than once.", self.aggregate_id).into());
        }
        self.created = Some(event);
        Ok(())
    }
}
