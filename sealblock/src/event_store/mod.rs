//! The persistence contract for event-sourced aggregates.
//!
//! The block factory only consumes this contract. `SledRepository` is the adapter
//! shipped with this crate; any append-only log can be plugged in instead.

mod error;
mod sled_repository;

pub use error::RepositoryError;
pub use sled_repository::SledRepository;

use crate::{
    event::{Aggregate, AggregateId},
    BoxError,
};
use std::sync::Arc;

/// Loads and saves the events of aggregates.
pub trait Repository<E> {
    /// Replay all stored events of `aggregate_id` onto `aggregate`.
    fn load<A>(&self, aggregate: &mut A, aggregate_id: &AggregateId) -> Result<(), BoxError>
    where
        A: Aggregate<Event = E>;

    /// Append `events` to the history of `aggregate_id`.
    ///
    /// Saving a creation event for an aggregate that already exists must fail
    /// instead of duplicating its history.
    fn save(&self, aggregate_id: &AggregateId, events: Vec<E>) -> Result<(), BoxError>;

    /// Tear down the connection to the store.
    fn close(self) -> Result<(), BoxError>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl<E, R> Repository<E> for Arc<R>
where
    R: Repository<E>,
{
    fn load<A>(&self, aggregate: &mut A, aggregate_id: &AggregateId) -> Result<(), BoxError>
    where
        A: Aggregate<Event = E>,
    {
        (**self).load(aggregate, aggregate_id)
    }

    fn save(&self, aggregate_id: &AggregateId, events: Vec<E>) -> Result<(), BoxError> {
        (**self).save(aggregate_id, events)
    }

    /// Only the last handle closes the underlying repository.
    fn close(self) -> Result<(), BoxError> {
        match Arc::try_unwrap(self) {
            Ok(repository) => repository.close(),
            Err(_) => Ok(()),
        }
    }
}
