//! Domain events and the event-sourced `Aggregate` abstraction.
//!
//! Events are append-only: they are never updated or deleted.
//! The state of an `Aggregate` is the result of replaying its events in order.

mod block;
mod leader;
mod p2p;

pub use block::BlockCreatedEvent;
pub use leader::LeaderUpdated;
pub use p2p::{
    ConnectionCreatedEvent, ConnectionDisconnectedEvent, LeaderChangeEvent, LeaderReceivedEvent,
    NodeCreatedEvent, NodeListReceivedEvent,
};

use crate::{consensus::Seal, BoxError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fmt, time::SystemTime};

/// Identifies an aggregate in the event store.
///
/// Blocks are identified by their `Seal` (content addressed), so re-proposing
/// identical content always maps to the same aggregate.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Create an aggregate id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Seal> for AggregateId {
    fn from(seal: &Seal) -> Self {
        Self(seal.to_hex())
    }
}

impl From<&str> for AggregateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Metadata carried by every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventModel {
    /// The aggregate the event belongs to.
    pub aggregate_id: AggregateId,
    /// Position of the event in the aggregate's history, starting at `0`.
    pub version: u64,
    /// The time the event was created.
    pub time: SystemTime,
}

impl EventModel {
    /// Create metadata for the first event of an aggregate.
    #[must_use]
    pub fn new(aggregate_id: AggregateId) -> Self {
        Self::with_version(aggregate_id, 0)
    }

    /// Create metadata for the event at `version` of an aggregate.
    #[must_use]
    pub fn with_version(aggregate_id: AggregateId, version: u64) -> Self {
        Self {
            aggregate_id,
            version,
            time: SystemTime::now(),
        }
    }
}

/// A domain event that can be stored in an event store.
pub trait Event: Serialize + DeserializeOwned {
    /// A name describing the kind of event.
    const EVENT_TYPE: &'static str;

    /// Get the event's metadata.
    fn model(&self) -> &EventModel;
}

/// An event-sourced entity.
pub trait Aggregate {
    /// The events changing this aggregate.
    type Event;

    /// The id of the aggregate.
    fn aggregate_id(&self) -> AggregateId;

    /// Apply an `event` to the aggregate's state.
    fn on(&mut self, event: Self::Event) -> Result<(), BoxError>;
}

/// Implement `Event` for a type with a `model: EventModel` field.
macro_rules! impl_event {
    ($($ty:ident $(<$generic:ident>)?),* $(,)?) => {
        $(
            impl$(<$generic>)? $crate::event::Event for $ty$(<$generic>)?
            $(where $generic: ::serde::Serialize + ::serde::de::DeserializeOwned)?
            {
                const EVENT_TYPE: &'static str = stringify!($ty);

                fn model(&self) -> &$crate::event::EventModel {
                    &self.model
                }
            }
        )*
    };
}

impl_event!(
    BlockCreatedEvent<T>,
    LeaderUpdated,
    LeaderChangeEvent,
    ConnectionCreatedEvent,
    ConnectionDisconnectedEvent,
    NodeCreatedEvent,
    LeaderReceivedEvent,
    NodeListReceivedEvent,
);
