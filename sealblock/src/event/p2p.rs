//! Events exchanged with the peer-to-peer layer.

use super::EventModel;
use crate::{leader::Leader, node::Node};
use serde::{Deserialize, Serialize};

/// Published when this node noticed a change of leadership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderChangeEvent {
    /// The event's metadata.
    pub model: EventModel,
}

/// A connection to another node was established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCreatedEvent {
    /// The event's metadata.
    pub model: EventModel,
    /// The address of the connected node.
    pub address: String,
}

/// A connection to another node was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDisconnectedEvent {
    /// The event's metadata.
    pub model: EventModel,
}

/// A node was added to the known nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCreatedEvent {
    /// The event's metadata.
    pub model: EventModel,
}

/// Another node told us who the leader is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderReceivedEvent {
    /// The event's metadata.
    pub model: EventModel,
    /// The announced leader.
    pub leader: Leader,
}

/// Another node sent us its list of known nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeListReceivedEvent {
    /// The event's metadata.
    pub model: EventModel,
    /// The received nodes in the sender's order.
    pub node_list: Vec<Node>,
}
