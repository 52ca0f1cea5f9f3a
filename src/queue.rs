// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A bounded FIFO of records shared by producers and one consumer.

use std::collections::VecDeque;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use crate::record::Record;

#[derive(Debug, Default)]
struct State {
    records: VecDeque<Record>,
    wake_pending: bool,
}

/// A FIFO queue of records with an optional capacity.
///
/// Enqueueing never blocks: when the queue is full the new record is discarded and counted in
/// [`dropped`](NotificationQueue::dropped). Records already queued are never evicted.
///
/// # Examples
///
/// ```
/// use logweave::queue::NotificationQueue;
/// use logweave::record::Priority;
/// use logweave::record::Record;
///
/// let queue = NotificationQueue::with_capacity(1);
/// assert!(queue.enqueue(Record::new("app", "kept", Priority::Information)));
/// assert!(!queue.enqueue(Record::new("app", "dropped", Priority::Information)));
/// assert_eq!(queue.dropped(), 1);
/// assert_eq!(queue.try_dequeue().unwrap().text(), "kept");
/// ```
#[derive(Debug, Default)]
pub struct NotificationQueue {
    state: Mutex<State>,
    available: Condvar,
    capacity: AtomicUsize,
    dropped: AtomicUsize,
}

impl NotificationQueue {
    /// Create an unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue holding at most `capacity` records. Zero means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        let queue = Self::default();
        queue.set_capacity(capacity);
        queue
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a record, or drop it if the queue is full.
    ///
    /// Return whether the record was queued.
    pub fn enqueue(&self, record: Record) -> bool {
        let queued = self.push(record);
        if !queued {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queued
    }

    /// Append a record if there is room, without counting a drop otherwise.
    pub(crate) fn push(&self, record: Record) -> bool {
        let capacity = self.capacity();
        let mut state = self.state();
        if capacity > 0 && state.records.len() >= capacity {
            return false;
        }
        state.records.push_back(record);
        drop(state);
        self.available.notify_one();
        true
    }

    /// Remove the oldest record, waiting until one is available or
    /// [`wake_all`](NotificationQueue::wake_all) is called.
    ///
    /// Return `None` when woken with nothing to deliver. A wake-up issued while no consumer was
    /// waiting is kept for the next call.
    pub fn dequeue_blocking(&self) -> Option<Record> {
        let mut state = self.state();
        loop {
            if let Some(record) = state.records.pop_front() {
                return Some(record);
            }
            if state.wake_pending {
                state.wake_pending = false;
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Like [`dequeue_blocking`](NotificationQueue::dequeue_blocking), giving up after
    /// `timeout`.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<Record> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state();
        loop {
            if let Some(record) = state.records.pop_front() {
                return Some(record);
            }
            if state.wake_pending {
                state.wake_pending = false;
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            state = self
                .available
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
    }

    /// Remove the oldest record if there is one.
    pub fn try_dequeue(&self) -> Option<Record> {
        self.state().records.pop_front()
    }

    /// Wake every waiting consumer.
    pub fn wake_all(&self) {
        self.state().wake_pending = true;
        self.available.notify_all();
    }

    /// The number of queued records.
    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    /// Whether no record is queued.
    pub fn is_empty(&self) -> bool {
        self.state().records.is_empty()
    }

    /// The maximum number of queued records. Zero means unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// Change the capacity. Records already queued are kept even if they exceed it.
    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity, Ordering::Relaxed);
    }

    /// The number of records dropped since the counter was last taken.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Return the drop counter and reset it to zero.
    pub fn take_dropped(&self) -> usize {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Add `count` back to the drop counter.
    pub(crate) fn restore_dropped(&self, count: usize) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Discard every queued record.
    pub fn clear(&self) {
        self.state().records.clear();
    }
}
