//! Wire the components of a node together.

use crate::{
    config::NodeConfig,
    consensus::{
        BlockFactory, DefaultBlock, DefaultTransaction, DefaultValidator, Height, Proposer, Seal,
    },
    event::{BlockCreatedEvent, LeaderUpdated},
    event_store::{Repository, SledRepository},
    leader::{LeaderEventHandler, LeaderRepository},
    txpool::{SendTransactionsToLeader, TransactionPool, TransactionRouter, TransactionSender},
    BoxError, Error,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

type NodeFactory = BlockFactory<DefaultValidator, Arc<SledRepository>>;
type NodeProposer = Proposer<DefaultValidator, Arc<SledRepository>>;

/// A running node: genesis block, leader tracking, transaction pool and router.
///
/// The router runs as a tokio task, so a `Runtime` must be started inside a tokio runtime.
pub struct Runtime {
    config: NodeConfig,
    repository: Arc<SledRepository>,
    factory: Arc<NodeFactory>,
    genesis: DefaultBlock<DefaultTransaction>,
    leader_repository: LeaderRepository,
    leader_event_handler: LeaderEventHandler,
    pool: Arc<TransactionPool<DefaultTransaction>>,
    proposer: Arc<NodeProposer>,
    router_task: JoinHandle<()>,
}

impl Runtime {
    /// Start a node described by `config`.
    ///
    /// Transactions are forwarded to the leader with `sender`.
    pub fn start(
        config: NodeConfig,
        sender: Arc<dyn TransactionSender<DefaultTransaction>>,
    ) -> Result<Self, BoxError> {
        let repository = Arc::new(SledRepository::new(&config.block_path)?);
        let factory = Arc::new(
            BlockFactory::new(DefaultValidator, repository.clone())
                .with_timestamp_precision(config.timestamp_precision()),
        );
        let genesis: DefaultBlock<DefaultTransaction> =
            factory.create_genesis_block(&config.genesis_path)?;

        let proposer = Arc::new(Proposer::new(
            factory.clone(),
            config.node_id.as_bytes().to_vec(),
            &genesis,
        ));

        let leader_repository = LeaderRepository::new();
        let leader_event_handler = LeaderEventHandler::new(leader_repository.clone());
        let pool = Arc::new(TransactionPool::new());

        let router = TransactionRouter::new(
            config.node_id.clone(),
            leader_repository.clone(),
            pool.clone(),
            proposer.clone(),
            sender,
            config.routing_interval(),
        );
        let router_task = tokio::spawn(router.run());

        log::info!(
            "Node {} started on genesis block {}.",
            config.node_id,
            genesis.seal
        );

        Ok(Self {
            config,
            repository,
            factory,
            genesis,
            leader_repository,
            leader_event_handler,
            pool,
            proposer,
            router_task,
        })
    }

    /// The configuration the node was started with.
    #[must_use]
    pub const fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The genesis block created at start.
    #[must_use]
    pub const fn genesis_block(&self) -> &DefaultBlock<DefaultTransaction> {
        &self.genesis
    }

    /// The shared current leader.
    #[must_use]
    pub const fn leader_repository(&self) -> &LeaderRepository {
        &self.leader_repository
    }

    /// The pool of uncommitted transactions.
    #[must_use]
    pub const fn pool(&self) -> &Arc<TransactionPool<DefaultTransaction>> {
        &self.pool
    }

    /// The height of the newest block created by this node.
    #[must_use]
    pub fn height(&self) -> Height {
        self.proposer.height()
    }

    /// The seal of the newest block created by this node.
    #[must_use]
    pub fn seal(&self) -> Seal {
        self.proposer.seal()
    }

    /// Apply a leadership change announced by the leader election.
    pub fn handle_leader_updated_event(&self, event: &LeaderUpdated) -> Result<(), Error> {
        self.leader_event_handler.handle_leader_updated_event(event)
    }

    /// Pool a `transaction` received from a client.
    pub fn submit(&self, transaction: DefaultTransaction) -> bool {
        self.pool.add(transaction)
    }

    /// Pool the transactions another node forwarded to this node.
    pub fn receive_forwarded(
        &self,
        message: SendTransactionsToLeader<DefaultTransaction>,
    ) -> usize {
        self.pool.receive_forwarded(message)
    }

    /// Load the block sealed with `seal` and verify its content against the seal.
    pub fn load_block(&self, seal: &Seal) -> Result<DefaultBlock<DefaultTransaction>, Error> {
        self.factory.load_block(seal)
    }

    /// Stop routing and flush the event store.
    pub async fn shutdown(self) -> Result<(), BoxError> {
        let Self {
            config,
            repository,
            factory,
            proposer,
            router_task,
            ..
        } = self;

        router_task.abort();
        if let Err(err) = router_task.await {
            if !err.is_cancelled() {
                log::error!("Router of node {} failed: {}", config.node_id, err);
            }
        }
        drop(proposer);
        drop(factory);

        repository.flush()?;
        Repository::<BlockCreatedEvent<DefaultTransaction>>::close(repository)?;
        log::info!("Node {} stopped.", config.node_id);
        Ok(())
    }
}
