use super::{Queue, SendTransactionsToLeader, TxpoolQueryService};
use crate::BoxError;
use std::{
    collections::{HashSet, VecDeque},
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::Notify;

/// The number of committed transactions a pool remembers by default.
pub const DEFAULT_COMMITTED_CAPACITY: usize = 10_000;

/// The uncommitted transactions of this node.
///
/// Each transaction is pooled at most once. Transactions that were recently sealed
/// into a block are remembered and not pooled again.
/// Adding transactions wakes up a `TransactionRouter` waiting on `notifier()`.
#[derive(Debug)]
pub struct TransactionPool<T> {
    inner: Mutex<Inner<T>>,
    notifier: Arc<Notify>,
}

#[derive(Debug)]
struct Inner<T> {
    queue: Queue<T>,
    committed: Committed<T>,
}

/// The most recently committed transactions, oldest first.
#[derive(Debug)]
struct Committed<T> {
    order: VecDeque<T>,
    set: HashSet<T>,
    capacity: usize,
}

impl<T> Committed<T>
where
    T: Clone + Eq + Hash,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            set: HashSet::new(),
            capacity,
        }
    }

    fn contains(&self, transaction: &T) -> bool {
        self.set.contains(transaction)
    }

    /// Remember `transaction`, forgetting the oldest one when full.
    fn insert(&mut self, transaction: T) {
        if self.capacity == 0 || !self.set.insert(transaction.clone()) {
            return;
        }
        self.order.push_back(transaction);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.set.remove(&oldest);
            }
        }
    }
}

impl<T> Inner<T>
where
    T: Clone + Eq + Hash,
{
    fn is_known(&self, transaction: &T) -> bool {
        self.committed.contains(transaction) || self.queue.contains(transaction)
    }
}

impl<T> Default for TransactionPool<T>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::with_committed_capacity(DEFAULT_COMMITTED_CAPACITY)
    }
}

impl<T> TransactionPool<T>
where
    T: Clone + Eq + Hash,
{
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pool remembering the last `capacity` committed transactions.
    #[must_use]
    pub fn with_committed_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: Queue::default(),
                committed: Committed::with_capacity(capacity),
            }),
            notifier: Arc::default(),
        }
    }

    fn inner(&self) -> MutexGuard<Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the notifier signalled whenever transactions are added.
    #[must_use]
    pub fn notifier(&self) -> Arc<Notify> {
        self.notifier.clone()
    }

    /// Pool a `transaction` received from a client.
    ///
    /// Returns `false` if the transaction was already pooled or committed.
    pub fn add(&self, transaction: T) -> bool {
        {
            let mut inner = self.inner();
            if inner.is_known(&transaction) {
                return false;
            }
            inner.queue.insert(transaction);
        }
        self.notifier.notify_one();
        true
    }

    /// Pool the transactions another node forwarded to the leader.
    ///
    /// Forwarding may deliver a transaction more than once, so transactions
    /// that are already pooled or committed are skipped.
    /// Returns the number of newly pooled transactions.
    pub fn receive_forwarded(&self, message: SendTransactionsToLeader<T>) -> usize {
        if !message.has_forwarding_protocol() {
            log::warn!(
                "Ignoring transactions from {} with unknown protocol {}.",
                message.sender,
                message.protocol
            );
            return 0;
        }

        let added = {
            let mut inner = self.inner();
            let mut added = 0;
            for transaction in &message.transactions {
                if !inner.is_known(transaction) {
                    inner.queue.insert(transaction.clone());
                    added += 1;
                }
            }
            added
        };

        log::debug!(
            "Received {} transactions from {} ({} new).",
            message.transactions.len(),
            message.sender,
            added
        );
        if added > 0 {
            self.notifier.notify_one();
        }
        added
    }

    /// Mark `transactions` as sealed into a block.
    ///
    /// They are removed from the pool and not pooled again while remembered.
    pub fn commit(&self, transactions: &[T]) {
        let mut inner = self.inner();
        inner.queue.remove_all(transactions);
        for transaction in transactions {
            inner.committed.insert(transaction.clone());
        }
    }

    /// Take all pooled transactions out of the pool.
    pub fn take_all(&self) -> Vec<T> {
        self.inner().queue.drain()
    }

    /// Put `transactions` back in front of the pool.
    pub fn requeue(&self, transactions: Vec<T>) {
        self.inner().queue.requeue(transactions);
    }

    /// Remove the given `transactions` from the pool.
    ///
    /// Returns the number of removed transactions.
    pub fn remove_all(&self, transactions: &[T]) -> usize {
        self.inner().queue.remove_all(transactions).len()
    }

    /// Get the number of pooled transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner().queue.len()
    }

    /// Check whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner().queue.is_empty()
    }
}

impl<T> TxpoolQueryService<T> for TransactionPool<T>
where
    T: Clone + Eq + Hash,
{
    fn find_uncommitted_transactions(&self) -> Result<Vec<T>, BoxError> {
        Ok(self.inner().queue.items())
    }
}
