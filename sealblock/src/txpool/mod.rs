//! Leader-gated routing of pooled transactions.
//!
//! Every node pools the transactions it receives. The leader seals them into blocks,
//! all other nodes forward them to the leader.

mod message;
mod pool;
mod queue;
mod router;

pub use message::SendTransactionsToLeader;
pub use pool::{TransactionPool, DEFAULT_COMMITTED_CAPACITY};
pub use queue::Queue;
pub use router::{BlockProposer, Routing, TransactionRouter, TransactionSender};

use crate::{leader::Leader, node::NodeId, BoxError};

/// Identifies messages carrying transactions forwarded to the leader.
pub const SEND_TRANSACTIONS_TO_LEADER_PROTOCOL: &str = "SendTransactionsToLeaderProtocol";

/// Check whether the node `node_id` is the `leader`.
///
/// ```
/// use sealblock::{leader::Leader, node::NodeId, txpool::is_leader};
///
/// let leader = Leader::new(NodeId::from("a"));
/// assert!(is_leader(&NodeId::from("a"), &leader));
/// assert!(!is_leader(&NodeId::from("b"), &leader));
/// ```
#[must_use]
pub fn is_leader(node_id: &NodeId, leader: &Leader) -> bool {
    *node_id == leader.id
}

/// Collect the `transactions` matching `predicate`, keeping their order.
///
/// ```
/// use sealblock::txpool::filter;
///
/// let odd = filter(&[1, 2, 3, 4, 5], |n| n % 2 == 1);
/// assert_eq!(odd, [1, 3, 5]);
/// ```
pub fn filter<T>(transactions: &[T], predicate: impl Fn(&T) -> bool) -> Vec<T>
where
    T: Clone,
{
    transactions
        .iter()
        .filter(|transaction| predicate(transaction))
        .cloned()
        .collect()
}

/// Queries the transactions that are not part of a block yet.
pub trait TxpoolQueryService<T> {
    /// Get all uncommitted transactions in the order they were received.
    fn find_uncommitted_transactions(&self) -> Result<Vec<T>, BoxError>;
}
