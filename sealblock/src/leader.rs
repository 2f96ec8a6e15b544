//! The current leader of the network.
//!
//! The leader election itself lives outside of this crate, only its effect
//! (a `LeaderUpdated` event) is handled here.

use crate::{event::LeaderUpdated, if_monitoring, node::NodeId, Error};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

if_monitoring! {
    use lazy_static::lazy_static;
    use prometheus::{register_int_counter, IntCounter};

    lazy_static! {
        /// Counts the leadership changes seen by this node.
        static ref LEADER_UPDATES: IntCounter = register_int_counter!(
            "leader_updates",
            "The number of handled leader updates."
        )
        .unwrap();
    }
}

/// The node currently allowed to propose blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leader {
    /// The leader's identifier.
    pub id: NodeId,
}

impl Leader {
    /// Create a new `Leader`.
    #[must_use]
    pub const fn new(id: NodeId) -> Self {
        Self { id }
    }
}

/// Holds the single current `Leader`.
///
/// Cloning yields another handle to the same slot.
/// The last `set` wins, there is no history.
#[derive(Debug, Clone, Default)]
pub struct LeaderRepository {
    leader: Arc<RwLock<Option<Leader>>>,
}

impl LeaderRepository {
    /// Create a repository without a known leader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository knowing `leader`.
    #[must_use]
    pub fn with_leader(leader: Leader) -> Self {
        Self {
            leader: Arc::new(RwLock::new(Some(leader))),
        }
    }

    /// Replace the current leader.
    pub fn set(&self, leader: Leader) {
        *self.leader.write().unwrap_or_else(PoisonError::into_inner) = Some(leader);
    }

    /// Get the current leader, `None` while no leader was announced.
    #[must_use]
    pub fn get(&self) -> Option<Leader> {
        self.leader
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Applies leadership changes to a `LeaderRepository`.
#[derive(Debug, Clone)]
pub struct LeaderEventHandler {
    leader_repository: LeaderRepository,
}

impl LeaderEventHandler {
    /// Create a handler writing into `leader_repository`.
    #[must_use]
    pub const fn new(leader_repository: LeaderRepository) -> Self {
        Self { leader_repository }
    }

    /// Make `event.leader_id` the current leader.
    ///
    /// The announced id is trusted as is, so this never fails.
    pub fn handle_leader_updated_event(&self, event: &LeaderUpdated) -> Result<(), Error> {
        let previous = self.leader_repository.get();
        self.leader_repository
            .set(Leader::new(event.leader_id.clone()));

        match previous {
            Some(previous) if previous.id == event.leader_id => {
                log::trace!("Leader {} was confirmed.", event.leader_id);
            }
            Some(previous) => {
                log::info!("Leader changed from {} to {}.", previous.id, event.leader_id);
            }
            None => log::info!("Leader {} was announced.", event.leader_id),
        }

        if_monitoring!({
            LEADER_UPDATES.inc();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn no_leader_before_the_first_update() {
        assert_eq!(LeaderRepository::new().get(), None);
    }

    #[test]
    fn last_update_wins() {
        let repository = LeaderRepository::new();
        let handler = LeaderEventHandler::new(repository.clone());

        handler
            .handle_leader_updated_event(&LeaderUpdated::new("a".into()))
            .unwrap();
        handler
            .handle_leader_updated_event(&LeaderUpdated::new("b".into()))
            .unwrap();

        assert_eq!(repository.get(), Some(Leader::new("b".into())));
    }

    #[test]
    fn repeated_updates_are_accepted() {
        let repository = LeaderRepository::with_leader(Leader::new("a".into()));
        let handler = LeaderEventHandler::new(repository.clone());

        assert!(handler
            .handle_leader_updated_event(&LeaderUpdated::new("a".into()))
            .is_ok());
        assert_eq!(repository.get(), Some(Leader::new("a".into())));
    }

    #[test]
    fn unknown_leaders_are_trusted() {
        let repository = LeaderRepository::new();
        let handler = LeaderEventHandler::new(repository.clone());

        assert!(handler
            .handle_leader_updated_event(&LeaderUpdated::new("not-a-member".into()))
            .is_ok());
        assert_eq!(repository.get().unwrap().id.as_str(), "not-a-member");
    }

    #[test]
    fn readers_see_a_complete_leader() {
        let repository = LeaderRepository::new();
        let candidates: Vec<NodeId> = (0..8).map(|i| NodeId::new(format!("node-{}", i))).collect();

        let writers: Vec<_> = candidates
            .iter()
            .cloned()
            .map(|id| {
                let handler = LeaderEventHandler::new(repository.clone());
                thread::spawn(move || {
                    for _ in 0..100 {
                        handler
                            .handle_leader_updated_event(&LeaderUpdated::new(id.clone()))
                            .unwrap();
                    }
                })
            })
            .collect();

        let reader = {
            let repository = repository.clone();
            let candidates = candidates.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    if let Some(leader) = repository.get() {
                        assert!(candidates.contains(&leader.id));
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        let leader = repository.get().unwrap();
        assert!(candidates.contains(&leader.id));
    }
}
