use super::EventModel;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Published by the leader election when a new leader was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderUpdated {
    /// The event's metadata.
    pub model: EventModel,
    /// The new leader.
    pub leader_id: NodeId,
}

impl LeaderUpdated {
    /// Create a new event announcing `leader_id` as leader.
    #[must_use]
    pub fn new(leader_id: NodeId) -> Self {
        Self {
            model: EventModel::new(leader_id.as_str().into()),
            leader_id,
        }
    }
}
