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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::Error;
use crate::ErrorKind;
use crate::asynchronous::ThreadPriority;
use crate::asynchronous::drop_notice;
use crate::asynchronous::worker::Shared;
use crate::asynchronous::worker::Worker;
use crate::directory::Directory;
use crate::record::Record;
use crate::sink::SharedSink;
use crate::sink::Sink;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A sink that delivers records to its downstream sink on a dedicated worker thread.
///
/// [`log`](Sink::log) only enqueues. The worker is spawned on [`open`](Sink::open) or on the
/// first record, and [`close`](Sink::close) waits until every queued record has been delivered
/// before stopping it. Dropping the sink closes it.
///
/// Properties:
///
/// * `channel`: the downstream sink, by directory name.
/// * `queueSize`: a positive capacity, or `none`, `unlimited`, `0` or empty for no limit.
///   Only affects records enqueued afterwards.
/// * `priority`: one of `lowest`, `low`, `normal`, `high`, `highest`. Applied the next time
///   the worker starts.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logweave::asynchronous::AsyncSink;
/// use logweave::record::Priority;
/// use logweave::record::Record;
/// use logweave::sink::MemorySink;
/// use logweave::sink::Sink;
///
/// let memory = Arc::new(MemorySink::default());
/// let sink = AsyncSink::new(memory.clone());
/// sink.log(&Record::new("app", "later", Priority::Information)).unwrap();
/// sink.close().unwrap();
/// assert_eq!(memory.texts(), vec!["later".to_string()]);
/// ```
#[derive(Debug)]
pub struct AsyncSink {
    shared: Arc<Shared>,
    thread_name: String,
    priority: Mutex<ThreadPriority>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closing: AtomicBool,
}

impl AsyncSink {
    /// Create an unbounded async sink forwarding to `downstream`.
    pub fn new(downstream: SharedSink) -> AsyncSink {
        AsyncBuilder::new("logweave-async")
            .downstream(downstream)
            .build()
    }

    fn worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The current downstream sink, if any.
    pub fn downstream(&self) -> Option<SharedSink> {
        self.shared.downstream()
    }

    /// Replace the downstream sink.
    ///
    /// Records already taken by the worker go to the sink that was current when they were
    /// taken.
    pub fn set_downstream(&self, downstream: Option<SharedSink>) {
        self.shared.set_downstream(downstream);
    }

    /// The queue capacity. Zero means unbounded.
    pub fn queue_size(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Change the queue capacity. Zero means unbounded.
    pub fn set_queue_size(&self, size: usize) {
        self.shared.queue.set_capacity(size);
    }

    /// The priority the worker thread starts with.
    pub fn thread_priority(&self) -> ThreadPriority {
        *self.priority.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Change the worker priority. Takes effect the next time the worker starts.
    pub fn set_thread_priority(&self, priority: ThreadPriority) {
        *self.priority.lock().unwrap_or_else(|e| e.into_inner()) = priority;
    }

    /// The number of records waiting for the worker.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// The number of records dropped since the last drop notice.
    pub fn dropped(&self) -> usize {
        self.shared.queue.dropped()
    }

    /// Whether the worker is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }
}

impl Sink for AsyncSink {
    fn log(&self, record: &Record) -> Result<(), Error> {
        // records arriving during close, possibly from the downstream itself, are drained by
        // the stopping worker
        if !self.is_running() && !self.closing.load(Ordering::Acquire) {
            self.open()?;
        }

        let queue = &self.shared.queue;
        let dropped = queue.take_dropped();
        if dropped > 0 && !queue.push(drop_notice(record.source(), dropped)) {
            queue.restore_dropped(dropped);
        }
        queue.enqueue(record.clone());
        Ok(())
    }

    fn open(&self) -> Result<(), Error> {
        let mut worker = self.worker();
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Ok(());
        }
        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                self.shared.trap(&worker_panicked());
            }
        }

        self.shared.running.store(true, Ordering::Release);
        let task = Worker::new(self.shared.clone(), self.thread_priority());
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || task.run())
            .map_err(|err| {
                self.shared.running.store(false, Ordering::Release);
                Error::new(ErrorKind::Unexpected, "failed to spawn async sink worker")
                    .with_source(err)
            })?;
        *worker = Some(handle);
        Ok(())
    }

    fn close(&self) -> Result<(), Error> {
        let mut worker = self.worker();
        let Some(handle) = worker.take() else {
            return Ok(());
        };
        self.closing.store(true, Ordering::Release);

        while !self.shared.queue.is_empty() && !handle.is_finished() {
            thread::sleep(POLL_INTERVAL);
        }

        self.shared.running.store(false, Ordering::Release);
        while !handle.is_finished() {
            self.shared.queue.wake_all();
            thread::sleep(POLL_INTERVAL);
        }
        self.closing.store(false, Ordering::Release);

        handle.join().map_err(|_| worker_panicked())
    }

    fn flush(&self) -> Result<(), Error> {
        while self.is_running() && !self.shared.queue.is_empty() {
            thread::sleep(POLL_INTERVAL);
        }
        match self.downstream() {
            Some(downstream) => downstream.flush(),
            None => Ok(()),
        }
    }

    fn set_property(&self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "channel" => {
                let sink = Directory::global().sink_for_name(value)?;
                self.set_downstream(Some(sink));
                Ok(())
            }
            "queueSize" => {
                self.set_queue_size(parse_queue_size(value)?);
                Ok(())
            }
            "priority" => {
                self.set_thread_priority(value.parse()?);
                Ok(())
            }
            _ => Err(Error::property_not_supported(name)),
        }
    }

    fn get_property(&self, name: &str) -> Result<String, Error> {
        match name {
            "queueSize" => Ok(match self.queue_size() {
                0 => "none".to_string(),
                size => size.to_string(),
            }),
            "priority" => Ok(self.thread_priority().to_string()),
            _ => Err(Error::property_not_supported(name)),
        }
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            self.shared.trap(&err);
        }
    }
}

fn worker_panicked() -> Error {
    Error::new(ErrorKind::Unexpected, "async sink worker panicked")
}

fn parse_queue_size(value: &str) -> Result<usize, Error> {
    let value = value.trim();
    if value.is_empty()
        || value.eq_ignore_ascii_case("none")
        || value.eq_ignore_ascii_case("unlimited")
    {
        return Ok(0);
    }
    value
        .parse::<usize>()
        .map_err(|err| Error::invalid_argument("not a valid queue size", value).with_source(err))
}

/// A builder for configuring an [`AsyncSink`].
#[derive(Debug)]
pub struct AsyncBuilder {
    thread_name: String,
    downstream: Option<SharedSink>,
    queue_size: usize,
    priority: ThreadPriority,
    trap: Box<dyn Trap>,
}

impl AsyncBuilder {
    /// Create a new builder whose worker thread is named `thread_name`.
    pub fn new(thread_name: impl Into<String>) -> AsyncBuilder {
        AsyncBuilder {
            thread_name: thread_name.into(),
            downstream: None,
            queue_size: 0,
            priority: ThreadPriority::Normal,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the downstream sink.
    pub fn downstream(mut self, downstream: SharedSink) -> Self {
        self.downstream = Some(downstream);
        self
    }

    /// Set the queue capacity. Zero, the default, means unbounded.
    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Set the worker thread priority.
    pub fn priority(mut self, priority: ThreadPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the trap for errors raised by the downstream sink.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Build the async sink. The worker is not started until the sink is opened or used.
    pub fn build(self) -> AsyncSink {
        let Self {
            thread_name,
            downstream,
            queue_size,
            priority,
            trap,
        } = self;

        AsyncSink {
            shared: Arc::new(Shared::new(queue_size, downstream, trap)),
            thread_name,
            priority: Mutex::new(priority),
            worker: Mutex::new(None),
            closing: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Priority;
    use crate::sink::MemorySink;

    #[test]
    fn parses_queue_sizes() {
        assert_eq!(parse_queue_size("100").unwrap(), 100);
        assert_eq!(parse_queue_size(" 5 ").unwrap(), 5);
        assert_eq!(parse_queue_size("0").unwrap(), 0);
        assert_eq!(parse_queue_size("").unwrap(), 0);
        assert_eq!(parse_queue_size("None").unwrap(), 0);
        assert_eq!(parse_queue_size("UNLIMITED").unwrap(), 0);
        for bad in ["-1", "ten", "1.5"] {
            let err = parse_queue_size(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn properties_round_trip() {
        let sink = AsyncSink::new(Arc::new(MemorySink::default()));
        assert_eq!(sink.get_property("queueSize").unwrap(), "none");
        assert_eq!(sink.get_property("priority").unwrap(), "normal");

        sink.set_property("queueSize", "64").unwrap();
        sink.set_property("priority", "low").unwrap();
        assert_eq!(sink.get_property("queueSize").unwrap(), "64");
        assert_eq!(sink.get_property("priority").unwrap(), "low");

        let err = sink.set_property("priority", "urgent").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = sink.set_property("queueSize", "lots").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = sink.set_property("channel", "async-test-missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = sink.set_property("colour", "red").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyNotSupported);
    }

    #[test]
    fn open_and_close_are_idempotent() {
        let memory = Arc::new(MemorySink::default());
        let sink = AsyncSink::new(memory.clone());
        sink.close().unwrap();
        sink.open().unwrap();
        sink.open().unwrap();
        assert!(sink.is_running());

        sink.log(&Record::new("app", "one", Priority::Information)).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(!sink.is_running());
        assert_eq!(memory.texts(), vec!["one".to_string()]);

        sink.log(&Record::new("app", "two", Priority::Information)).unwrap();
        sink.close().unwrap();
        assert_eq!(memory.texts(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn without_downstream_records_are_discarded() {
        let sink = AsyncBuilder::new("async-test").build();
        sink.log(&Record::new("app", "nowhere", Priority::Information)).unwrap();
        sink.close().unwrap();
        assert_eq!(sink.pending(), 0);
    }
}
