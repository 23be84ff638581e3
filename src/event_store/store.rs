//! Bounded Event Store - capacity-limited, insertion-ordered event log
//!
//! One store holds the events of a single category. Appends go to the back;
//! once the store is full every append evicts exactly one event from the
//! front. Eviction follows insertion order, never the `timestamp` field.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::types::{EventRecord, NewEvent};
use crate::utils::time::now;

/// A page of events plus the size of the sequence it was cut from
#[derive(Debug, Clone)]
pub struct Page<P> {
    pub events: Vec<Arc<EventRecord<P>>>,
    pub total: usize,
}

impl<P> Page<P> {
    /// Cut `[offset, offset + limit)` out of `events`
    pub fn from_events(events: Vec<Arc<EventRecord<P>>>, offset: usize, limit: usize) -> Self {
        let total = events.len();
        let events = events.into_iter().skip(offset).take(limit).collect();
        Self { events, total }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Capacity-bounded FIFO event log for one category.
///
/// Records are shared as `Arc`s so readers clone pointers under the read
/// lock and never observe a half-built event. Writers are serialized by the
/// write lock, which keeps append + eviction a single linearizable step.
#[derive(Debug)]
pub struct BoundedEventStore<P> {
    name: &'static str,
    capacity: usize,
    events: RwLock<VecDeque<Arc<EventRecord<P>>>>,
}

impl<P> BoundedEventStore<P> {
    /// Create a store holding at most `capacity` events (minimum 1)
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            events: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Category name, used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of events
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Append an event, evicting the oldest one if the store is full.
    ///
    /// Assigns an id and defaults the timestamp to now when absent.
    pub fn append(&self, event: NewEvent<P>) -> Arc<EventRecord<P>> {
        let record = Arc::new(event.into_record(now()));

        let evicted = {
            let mut events = self.events.write();
            events.push_back(Arc::clone(&record));
            if events.len() > self.capacity {
                events.pop_front()
            } else {
                None
            }
        };

        if let Some(old) = evicted {
            debug!(store = self.name, evicted_id = %old.id, "evicted oldest event");
        }

        record
    }

    /// Events in insertion order starting at `offset`, at most `limit` of them.
    ///
    /// `total` is the store size at the moment of the read. Offsets past the
    /// end yield an empty page.
    pub fn slice(&self, offset: usize, limit: usize) -> Page<P> {
        let events = self.events.read();
        Page {
            events: events.iter().skip(offset).take(limit).cloned().collect(),
            total: events.len(),
        }
    }

    /// All events matching `predicate`, in insertion order
    pub fn filter<F>(&self, predicate: F) -> Vec<Arc<EventRecord<P>>>
    where
        F: Fn(&EventRecord<P>) -> bool,
    {
        self.events
            .read()
            .iter()
            .filter(|event| predicate(event))
            .cloned()
            .collect()
    }

    /// Every event, as observed at a single point in time
    pub fn snapshot(&self) -> Vec<Arc<EventRecord<P>>> {
        self.events.read().iter().cloned().collect()
    }
}
