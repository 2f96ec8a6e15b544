use super::{Repository, RepositoryError};
use crate::{
    event::{Aggregate, AggregateId, Event},
    BoxError,
};
use sled::{Batch, Config, Db, Tree};
use std::{
    convert::TryInto,
    sync::{Mutex, PoisonError},
};

const EVENTS_TREE_NAME: &[u8] = b"events";

// Aggregate ids are UTF-8, which never contains this byte.
const KEY_SEPARATOR: u8 = 0xff;

/// A `SledRepository` stores events of aggregates persistently on disk.
///
/// Events are keyed by their aggregate id followed by their version,
/// so the history of an aggregate is a single ordered key range.
/// Data is written to disk every 400ms.
pub struct SledRepository {
    database: Db,
    events: Tree,
    write_lock: Mutex<()>,
}

impl SledRepository {
    /// Open (or create) a repository at `path`.
    pub fn new(path: &str) -> Result<Self, RepositoryError> {
        let config = Config::default()
            .path(path)
            .cache_capacity(8_000_000)
            .flush_every_ms(Some(400))
            .snapshot_after_ops(100)
            .use_compression(false)
            .compression_factor(20);
        Self::open(&config)
    }

    /// Open a repository that is deleted when it is dropped.
    pub fn temporary() -> Result<Self, RepositoryError> {
        Self::open(&Config::default().temporary(true))
    }

    fn open(config: &Config) -> Result<Self, RepositoryError> {
        let database = config.open()?;
        let events = database.open_tree(EVENTS_TREE_NAME)?;
        Ok(Self {
            database,
            events,
            write_lock: Mutex::default(),
        })
    }

    /// Write all pending changes to disk and return the number of flushed bytes.
    pub fn flush(&self) -> Result<usize, RepositoryError> {
        Ok(self.database.flush()?)
    }

    /// The version the next event of `aggregate_id` must have.
    fn next_version(&self, aggregate_id: &AggregateId) -> Result<u64, RepositoryError> {
        let last_key = self.events.scan_prefix(key_prefix(aggregate_id)).keys().next_back();
        match last_key {
            None => Ok(0),
            Some(key) => {
                let key = key?;
                Ok(version_from_key(&key) + 1)
            }
        }
    }

    fn save_events<E>(
        &self,
        aggregate_id: &AggregateId,
        events: &[E],
    ) -> Result<(), RepositoryError>
    where
        E: Event,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let next_version = self.next_version(aggregate_id)?;

        let mut batch = Batch::default();
        for (offset, event) in (0..).zip(events) {
            let model = event.model();
            if &model.aggregate_id != aggregate_id {
                return Err(RepositoryError::ForeignEvent {
                    expected: aggregate_id.clone(),
                    found: model.aggregate_id.clone(),
                });
            }

            let expected = next_version + offset;
            if model.version != expected {
                if model.version == 0 {
                    return Err(RepositoryError::DuplicateAggregate(aggregate_id.clone()));
                }
                return Err(RepositoryError::VersionConflict {
                    aggregate_id: aggregate_id.clone(),
                    expected,
                    found: model.version,
                });
            }

            let value = postcard::to_stdvec(event)?;
            batch.insert(event_key(aggregate_id, model.version), value);
        }

        self.events.apply_batch(batch)?;
        log::debug!(
            "Saved {} {} event(s) for aggregate {}.",
            events.len(),
            E::EVENT_TYPE,
            aggregate_id
        );
        Ok(())
    }

    fn load_events<A, E>(
        &self,
        aggregate: &mut A,
        aggregate_id: &AggregateId,
    ) -> Result<(), BoxError>
    where
        A: Aggregate<Event = E>,
        E: Event,
    {
        let mut found = false;
        for value in self.events.scan_prefix(key_prefix(aggregate_id)).values() {
            let value = value.map_err(RepositoryError::from)?;
            let event: E = postcard::from_bytes(&value).map_err(RepositoryError::from)?;
            aggregate.on(event)?;
            found = true;
        }

        if found {
            Ok(())
        } else {
            Err(RepositoryError::UnknownAggregate(aggregate_id.clone()).into())
        }
    }
}

impl<E> Repository<E> for SledRepository
where
    E: Event,
{
    fn load<A>(&self, aggregate: &mut A, aggregate_id: &AggregateId) -> Result<(), BoxError>
    where
        A: Aggregate<Event = E>,
    {
        self.load_events(aggregate, aggregate_id)
    }

    fn save(&self, aggregate_id: &AggregateId, events: Vec<E>) -> Result<(), BoxError> {
        Ok(self.save_events(aggregate_id, &events)?)
    }

    fn close(self) -> Result<(), BoxError> {
        let bytes = self.flush()?;
        log::debug!("Flushed {} bytes before closing the event store.", bytes);
        Ok(())
    }
}

fn key_prefix(aggregate_id: &AggregateId) -> Vec<u8> {
    let mut prefix = aggregate_id.as_str().as_bytes().to_vec();
    prefix.push(KEY_SEPARATOR);
    prefix
}

fn event_key(aggregate_id: &AggregateId, version: u64) -> Vec<u8> {
    let mut key = key_prefix(aggregate_id);
    key.extend_from_slice(&version.to_be_bytes());
    key
}

fn version_from_key(key: &[u8]) -> u64 {
    let start = key.len().saturating_sub(8);
    key[start..].try_into().map_or(0, u64::from_be_bytes)
}
