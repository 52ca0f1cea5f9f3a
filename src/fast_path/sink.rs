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
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::ErrorKind;
use crate::asynchronous::drop_notice;
use crate::fast_path::Backend;
use crate::fast_path::backend::Message;
use crate::fast_path::backend::on_backend_thread;
use crate::formatter::SharedFormatter;
use crate::record::Record;
use crate::sink::SharedSink;
use crate::sink::Sink;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A sink that hands records to the shared [`Backend`] thread.
///
/// The optional formatter and the terminal sink both run on the backend thread. Errors they
/// raise go to the sink's trap.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logweave::fast_path::FastPathSink;
/// use logweave::record::Priority;
/// use logweave::record::Record;
/// use logweave::sink::MemorySink;
/// use logweave::sink::Sink;
///
/// let memory = Arc::new(MemorySink::default());
/// let sink = FastPathSink::new(memory.clone());
/// sink.log(&Record::new("app", "quick", Priority::Information)).unwrap();
/// sink.flush().unwrap();
/// assert_eq!(memory.texts(), vec!["quick".to_string()]);
/// ```
#[derive(Debug)]
pub struct FastPathSink {
    backend: &'static Backend,
    sink: SharedSink,
    formatter: Option<SharedFormatter>,
    trap: Arc<dyn Trap>,
    dropped: AtomicUsize,
}

impl FastPathSink {
    /// Create a sink delivering to `sink` through the global backend.
    pub fn new(sink: SharedSink) -> FastPathSink {
        FastPathSink::with_backend(Backend::global(), sink)
    }

    /// Create a sink delivering to `sink` through `backend`.
    pub fn with_backend(backend: &'static Backend, sink: SharedSink) -> FastPathSink {
        FastPathSink {
            backend,
            sink,
            formatter: None,
            trap: Arc::new(DefaultTrap::default()),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Render records with `formatter` on the backend thread before delivery.
    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Set the trap for errors raised on the backend thread.
    ///
    /// Default to [`DefaultTrap`].
    pub fn with_trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        let trap: Box<dyn Trap> = trap.into();
        self.trap = Arc::from(trap);
        self
    }

    /// The number of records dropped since the last drop notice.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    fn message(&self, record: Record) -> Message {
        Message::Log {
            record,
            sink: self.sink.clone(),
            formatter: self.formatter.clone(),
            trap: self.trap.clone(),
        }
    }
}

impl Sink for FastPathSink {
    fn log(&self, record: &Record) -> Result<(), Error> {
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            let notice = self.message(drop_notice(record.source(), dropped));
            if !self.backend.try_send(notice)? {
                self.dropped.fetch_add(dropped, Ordering::Relaxed);
            }
        }

        if !self.backend.try_send(self.message(record.clone()))? {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn open(&self) -> Result<(), Error> {
        self.sink.open()
    }

    fn close(&self) -> Result<(), Error> {
        self.flush()?;
        self.sink.close()
    }

    /// Block until the backend has delivered every record this sink sent before the call.
    ///
    /// On the backend thread, as when one fast path sink wraps another, the terminal sink is
    /// flushed in place without a rendezvous.
    fn flush(&self) -> Result<(), Error> {
        if on_backend_thread() {
            return self.sink.flush();
        }

        let (done, wait) = crossbeam_channel::bounded(0);
        self.backend.send(Message::Flush {
            sink: self.sink.clone(),
            trap: self.trap.clone(),
            done,
        })?;
        wait.recv()
            .map_err(|_| Error::new(ErrorKind::Unexpected, "fast path flush abandoned"))
    }

    fn get_property(&self, name: &str) -> Result<String, Error> {
        match name {
            "queueSize" => Ok(self.backend.capacity().to_string()),
            _ => Err(Error::property_not_supported(name)),
        }
    }
}

impl Drop for FastPathSink {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            self.trap.trap(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::CustomFormatter;
    use crate::record::Priority;
    use crate::sink::MemorySink;

    #[test]
    fn formats_on_the_backend_and_keeps_order() {
        let memory = Arc::new(MemorySink::default());
        let formatter =
            CustomFormatter::new(|r: &Record| Ok(format!("{}|{}", r.source(), r.text())));
        let sink = FastPathSink::new(memory.clone()).with_formatter(Arc::new(formatter));

        for i in 0..100 {
            sink.log(&Record::new("fast", i.to_string(), Priority::Debug)).unwrap();
        }
        sink.flush().unwrap();

        let expected: Vec<_> = (0..100).map(|i| format!("fast|{i}")).collect();
        assert_eq!(memory.texts(), expected);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn queue_size_is_fixed() {
        let sink = FastPathSink::new(Arc::new(MemorySink::default()));
        let err = sink.set_property("queueSize", "16").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyNotSupported);
        assert_eq!(
            sink.get_property("queueSize").unwrap(),
            Backend::global().capacity().to_string()
        );
    }
}
