use crate::event::AggregateId;
use err_derive::Error;

/// An error of the `event_store` module.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepositoryError {
    /// The events could not be stored correctly.
    #[error(display = "{}", 0)]
    Sled(#[error(from)] sled::Error),

    /// The events could not be encoded correctly.
    #[error(display = "{}", 0)]
    Encoding(#[error(from)] postcard::Error),

    /// The aggregate was already created.
    #[error(display = "The aggregate {} already exists.", 0)]
    DuplicateAggregate(AggregateId),

    /// The event versions do not continue the stored history.
    #[error(
        display = "Event version {} does not continue aggregate {} (expected {}).",
        found,
        aggregate_id,
        expected
    )]
    VersionConflict {
        /// The affected aggregate.
        aggregate_id: AggregateId,
        /// The next free version.
        expected: u64,
        /// The version of the rejected event.
        found: u64,
    },

    /// An event belongs to another aggregate than the one it is saved for.
    #[error(display = "The event belongs to aggregate {}, not {}.", found, expected)]
    ForeignEvent {
        /// The aggregate the events are saved for.
        expected: AggregateId,
        /// The aggregate the rejected event belongs to.
        found: AggregateId,
    },

    /// No events are stored for the aggregate.
    #[error(display = "The aggregate {} was not found.", 0)]
    UnknownAggregate(AggregateId),
}
