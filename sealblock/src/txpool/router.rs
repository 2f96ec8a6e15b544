use super::{is_leader, SendTransactionsToLeader, TransactionPool, TxpoolQueryService};
use crate::{consensus::Height, leader::LeaderRepository, node::NodeId, BoxError};
use futures::future::BoxFuture;
use std::{hash::Hash, sync::Arc, time::Duration};
use tokio::time::timeout;

/// Delivers forwarded transactions to another node.
///
/// The transport, including its retries and timeouts, is owned by the implementor.
pub trait TransactionSender<T>: Send + Sync {
    /// Send `message` to the node `leader`.
    fn send<'a>(
        &'a self,
        leader: &'a NodeId,
        message: SendTransactionsToLeader<T>,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// Seals transactions into a new block on the leader.
pub trait BlockProposer<T>: Send + Sync {
    /// Create a block of `transactions` and return its height.
    fn propose(&self, transactions: Vec<T>) -> Result<Height, BoxError>;
}

/// What a single routing round did with the pooled transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// No leader is known, the transactions stay pooled.
    NoLeader,
    /// There were no transactions to route.
    Idle,
    /// This node is the leader and created a block.
    Proposed {
        /// The number of sealed transactions.
        count: usize,
        /// The height of the created block.
        height: Height,
    },
    /// This node is the leader but the block could not be created.
    ProposalFailed(usize),
    /// The transactions were delivered to the leader.
    Forwarded {
        /// The receiving leader.
        leader: NodeId,
        /// The number of forwarded transactions.
        count: usize,
    },
    /// The leader could not be reached, the transactions stay pooled.
    ForwardFailed {
        /// The unreachable leader.
        leader: NodeId,
        /// The number of transactions that were not delivered.
        count: usize,
    },
}

/// Moves pooled transactions either into blocks or to the leader.
pub struct TransactionRouter<T> {
    node_id: NodeId,
    leader_repository: LeaderRepository,
    pool: Arc<TransactionPool<T>>,
    proposer: Arc<dyn BlockProposer<T>>,
    sender: Arc<dyn TransactionSender<T>>,
    interval: Duration,
}

impl<T> TransactionRouter<T>
where
    T: Clone + Eq + Hash + Send + Sync + 'static,
{
    /// Create a router for the node `node_id`.
    ///
    /// Without new transactions, pooled transactions are routed again after `interval`.
    pub fn new(
        node_id: NodeId,
        leader_repository: LeaderRepository,
        pool: Arc<TransactionPool<T>>,
        proposer: Arc<dyn BlockProposer<T>>,
        sender: Arc<dyn TransactionSender<T>>,
        interval: Duration,
    ) -> Self {
        Self {
            node_id,
            leader_repository,
            pool,
            proposer,
            sender,
            interval,
        }
    }

    /// Route all pooled transactions once.
    ///
    /// The leader seals them into a block and commits them in the pool.
    /// Every other node forwards them to the leader and only removes them
    /// from the pool after they were delivered.
    pub async fn route(&self) -> Result<Routing, BoxError> {
        let leader = match self.leader_repository.get() {
            Some(leader) => leader,
            None => {
                log::trace!("No leader known yet, keeping {} transactions.", self.pool.len());
                return Ok(Routing::NoLeader);
            }
        };

        if is_leader(&self.node_id, &leader) {
            Ok(self.propose())
        } else {
            self.forward(leader.id).await
        }
    }

    fn propose(&self) -> Routing {
        let transactions = self.pool.take_all();
        if transactions.is_empty() {
            return Routing::Idle;
        }

        let count = transactions.len();
        match self.proposer.propose(transactions.clone()) {
            Ok(height) => {
                self.pool.commit(&transactions);
                Routing::Proposed { count, height }
            }
            Err(err) => {
                log::error!("Failed to propose a block of {} transactions: {}", count, err);
                self.pool.requeue(transactions);
                Routing::ProposalFailed(count)
            }
        }
    }

    async fn forward(&self, leader: NodeId) -> Result<Routing, BoxError> {
        let pending = self.pool.find_uncommitted_transactions()?;
        if pending.is_empty() {
            return Ok(Routing::Idle);
        }

        let count = pending.len();
        let message = SendTransactionsToLeader::new(self.node_id.clone(), pending.clone());
        match self.sender.send(&leader, message).await {
            Ok(()) => {
                self.pool.remove_all(&pending);
                log::debug!("Forwarded {} transactions to leader {}.", count, leader);
                Ok(Routing::Forwarded { leader, count })
            }
            Err(err) => {
                log::warn!(
                    "Could not forward {} transactions to leader {}: {}",
                    count,
                    leader,
                    err
                );
                Ok(Routing::ForwardFailed { leader, count })
            }
        }
    }

    /// Route whenever transactions are added or `interval` elapsed.
    pub async fn run(self) {
        let notifier = self.pool.notifier();
        loop {
            // Timing out means routing a retry of the still pooled transactions.
            let _ = timeout(self.interval, notifier.notified()).await;

            match self.route().await {
                Ok(routing) => log::trace!("Routing round finished: {:?}", routing),
                Err(err) => log::error!("Routing round failed: {}", err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;
    use std::sync::Mutex;

    type Sent = Vec<(NodeId, SendTransactionsToLeader<&'static str>)>;

    #[derive(Default)]
    struct MockSender {
        sent: Mutex<Sent>,
        fail: bool,
    }

    impl TransactionSender<&'static str> for MockSender {
        fn send<'a>(
            &'a self,
            leader: &'a NodeId,
            message: SendTransactionsToLeader<&'static str>,
        ) -> BoxFuture<'a, Result<(), BoxError>> {
            Box::pin(async move {
                if self.fail {
                    return Err("connection refused".into());
                }
                self.sent.lock().unwrap().push((leader.clone(), message));
                Ok::<_, BoxError>(())
            })
        }
    }

    #[derive(Default)]
    struct MockProposer {
        proposed: Mutex<Vec<Vec<&'static str>>>,
        fail: bool,
    }

    impl BlockProposer<&'static str> for MockProposer {
        fn propose(&self, transactions: Vec<&'static str>) -> Result<Height, BoxError> {
            if self.fail {
                return Err("disk full".into());
            }
            let mut proposed = self.proposed.lock().unwrap();
            proposed.push(transactions);
            Ok(Height::new(proposed.len() as u64))
        }
    }

    struct Setup {
        leader_repository: LeaderRepository,
        pool: Arc<TransactionPool<&'static str>>,
        proposer: Arc<MockProposer>,
        sender: Arc<MockSender>,
        router: TransactionRouter<&'static str>,
    }

    fn setup(proposer: MockProposer, sender: MockSender) -> Setup {
        let leader_repository = LeaderRepository::new();
        let pool = Arc::new(TransactionPool::new());
        let proposer = Arc::new(proposer);
        let sender = Arc::new(sender);
        let router = TransactionRouter::new(
            NodeId::from("self"),
            leader_repository.clone(),
            pool.clone(),
            proposer.clone(),
            sender.clone(),
            Duration::from_millis(10),
        );
        Setup {
            leader_repository,
            pool,
            proposer,
            sender,
            router,
        }
    }

    #[tokio::test]
    async fn nothing_moves_without_a_leader() {
        let setup = setup(MockProposer::default(), MockSender::default());
        setup.pool.add("a");

        assert_eq!(setup.router.route().await.unwrap(), Routing::NoLeader);
        assert_eq!(setup.pool.len(), 1);
        assert!(setup.sender.sent.lock().unwrap().is_empty());
        assert!(setup.proposer.proposed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn the_leader_proposes_its_transactions() {
        let setup = setup(MockProposer::default(), MockSender::default());
        setup.leader_repository.set(Leader::new("self".into()));
        setup.pool.add("a");
        setup.pool.add("b");

        assert_eq!(
            setup.router.route().await.unwrap(),
            Routing::Proposed {
                count: 2,
                height: Height::new(1)
            }
        );
        assert!(setup.pool.is_empty());
        assert_eq!(*setup.proposer.proposed.lock().unwrap(), [vec!["a", "b"]]);
        assert!(setup.sender.sent.lock().unwrap().is_empty());

        assert_eq!(setup.router.route().await.unwrap(), Routing::Idle);
    }

    #[tokio::test]
    async fn failed_proposals_keep_the_transactions() {
        let proposer = MockProposer {
            fail: true,
            ..MockProposer::default()
        };
        let setup = setup(proposer, MockSender::default());
        setup.leader_repository.set(Leader::new("self".into()));
        setup.pool.add("a");

        assert_eq!(
            setup.router.route().await.unwrap(),
            Routing::ProposalFailed(1)
        );
        assert_eq!(setup.pool.take_all(), ["a"]);
    }

    #[tokio::test]
    async fn followers_forward_to_the_leader() {
        let setup = setup(MockProposer::default(), MockSender::default());
        setup.leader_repository.set(Leader::new("leader".into()));
        setup.pool.add("a");
        setup.pool.add("b");

        assert_eq!(
            setup.router.route().await.unwrap(),
            Routing::Forwarded {
                leader: "leader".into(),
                count: 2
            }
        );
        assert!(setup.pool.is_empty());

        let sent = setup.sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (leader, message) = &sent[0];
        assert_eq!(leader.as_str(), "leader");
        assert_eq!(message.protocol, "SendTransactionsToLeaderProtocol");
        assert_eq!(message.sender.as_str(), "self");
        assert_eq!(message.transactions, ["a", "b"]);
        assert!(setup.proposer.proposed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_forwards_keep_the_transactions() {
        let sender = MockSender {
            fail: true,
            ..MockSender::default()
        };
        let setup = setup(MockProposer::default(), sender);
        setup.leader_repository.set(Leader::new("leader".into()));
        setup.pool.add("a");

        assert_eq!(
            setup.router.route().await.unwrap(),
            Routing::ForwardFailed {
                leader: "leader".into(),
                count: 1
            }
        );
        assert_eq!(setup.pool.find_uncommitted_transactions().unwrap(), ["a"]);
    }

    #[tokio::test]
    async fn leadership_changes_redirect_routing() {
        let setup = setup(MockProposer::default(), MockSender::default());
        setup.leader_repository.set(Leader::new("leader".into()));
        setup.pool.add("a");
        setup.router.route().await.unwrap();

        setup.leader_repository.set(Leader::new("self".into()));
        setup.pool.add("b");
        setup.router.route().await.unwrap();

        assert_eq!(setup.sender.sent.lock().unwrap()[0].1.transactions, ["a"]);
        assert_eq!(*setup.proposer.proposed.lock().unwrap(), [vec!["b"]]);
    }

    #[tokio::test]
    async fn running_router_proposes_added_transactions() {
        let setup = setup(MockProposer::default(), MockSender::default());
        setup.leader_repository.set(Leader::new("self".into()));
        let pool = setup.pool.clone();
        let proposer = setup.proposer.clone();

        let handle = tokio::spawn(setup.router.run());
        pool.add("a");

        for _ in 0..100 {
            if !proposer.proposed.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(*proposer.proposed.lock().unwrap(), [vec!["a"]]);
    }

    #[tokio::test]
    async fn proposed_transactions_are_not_pooled_again() {
        let setup = setup(MockProposer::default(), MockSender::default());
        setup.leader_repository.set(Leader::new("self".into()));
        setup.pool.add("a");
        setup.router.route().await.unwrap();

        let resent = SendTransactionsToLeader::new(NodeId::from("follower"), vec!["a"]);
        assert_eq!(setup.pool.receive_forwarded(resent), 0);
        assert!(!setup.pool.add("a"));

        assert_eq!(setup.router.route().await.unwrap(), Routing::Idle);
        assert_eq!(*setup.proposer.proposed.lock().unwrap(), [vec!["a"]]);
    }

    #[tokio::test]
    async fn failed_proposals_are_not_committed() {
        let proposer = MockProposer {
            fail: true,
            ..MockProposer::default()
        };
        let setup = setup(proposer, MockSender::default());
        setup.leader_repository.set(Leader::new("self".into()));
        setup.pool.add("a");
        setup.router.route().await.unwrap();

        let resent = SendTransactionsToLeader::new(NodeId::from("follower"), vec!["a", "b"]);
        assert_eq!(setup.pool.receive_forwarded(resent), 1);
        assert_eq!(setup.pool.take_all(), ["a", "b"]);
    }
}
