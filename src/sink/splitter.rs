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

use crate::Error;
use crate::directory::Directory;
use crate::record::Record;
use crate::sink::SharedSink;
use crate::sink::Sink;

/// A sink that forwards every record to each of its downstream sinks, in insertion order.
///
/// A failing downstream does not stop delivery to the others; the first error is returned once
/// every sink has been tried.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logweave::record::Priority;
/// use logweave::record::Record;
/// use logweave::sink::MemorySink;
/// use logweave::sink::Sink;
/// use logweave::sink::SplitterSink;
///
/// let a = Arc::new(MemorySink::default());
/// let b = Arc::new(MemorySink::default());
/// let splitter = SplitterSink::default();
/// splitter.add(a.clone());
/// splitter.add(b.clone());
///
/// splitter.log(&Record::new("app", "both", Priority::Information)).unwrap();
/// assert_eq!(a.len(), 1);
/// assert_eq!(b.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SplitterSink {
    sinks: Mutex<Vec<SharedSink>>,
}

impl SplitterSink {
    fn sinks(&self) -> MutexGuard<'_, Vec<SharedSink>> {
        self.sinks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a downstream sink. A sink already present is ignored.
    pub fn add(&self, sink: SharedSink) {
        let mut sinks = self.sinks();
        if !sinks.iter().any(|s| Arc::ptr_eq(s, &sink)) {
            sinks.push(sink);
        }
    }

    /// Remove a downstream sink.
    pub fn remove(&self, sink: &SharedSink) {
        self.sinks().retain(|s| !Arc::ptr_eq(s, sink));
    }

    /// Remove every downstream sink.
    pub fn clear(&self) {
        self.sinks().clear();
    }

    /// The number of downstream sinks.
    pub fn len(&self) -> usize {
        self.sinks().len()
    }

    /// Whether there is no downstream sink.
    pub fn is_empty(&self) -> bool {
        self.sinks().is_empty()
    }

    fn snapshot(&self) -> Vec<SharedSink> {
        self.sinks().clone()
    }

    fn for_each(&self, mut f: impl FnMut(&SharedSink) -> Result<(), Error>) -> Result<(), Error> {
        let mut first_error = None;
        for sink in self.snapshot() {
            if let Err(err) = f(&sink) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Sink for SplitterSink {
    fn log(&self, record: &Record) -> Result<(), Error> {
        self.for_each(|sink| sink.log(record))
    }

    fn open(&self) -> Result<(), Error> {
        self.for_each(|sink| sink.open())
    }

    fn close(&self) -> Result<(), Error> {
        self.for_each(|sink| sink.close())
    }

    fn flush(&self) -> Result<(), Error> {
        self.for_each(|sink| sink.flush())
    }

    fn set_property(&self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "channel" => {
                let names = value
                    .split([',', ';'])
                    .map(str::trim)
                    .filter(|name| !name.is_empty());
                for name in names {
                    self.add(Directory::global().sink_for_name(name)?);
                }
                Ok(())
            }
            _ => Err(Error::property_not_supported(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::record::Priority;
    use crate::sink::MemorySink;

    #[derive(Debug)]
    struct FailingSink;

    impl Sink for FailingSink {
        fn log(&self, _: &Record) -> Result<(), Error> {
            Err(Error::new(ErrorKind::Io, "device gone"))
        }
    }

    #[test]
    fn ignores_duplicates_and_removes_by_identity() {
        let memory: SharedSink = Arc::new(MemorySink::default());
        let splitter = SplitterSink::default();
        splitter.add(memory.clone());
        splitter.add(memory.clone());
        assert_eq!(splitter.len(), 1);

        splitter.remove(&memory);
        assert!(splitter.is_empty());
    }

    #[test]
    fn delivers_to_all_and_reports_first_error() {
        let before = Arc::new(MemorySink::default());
        let after = Arc::new(MemorySink::default());
        let splitter = SplitterSink::default();
        splitter.add(before.clone());
        splitter.add(Arc::new(FailingSink));
        splitter.add(after.clone());

        let err = splitter
            .log(&Record::new("app", "fan out", Priority::Error))
            .unwrap_err();
        assert_eq!(err.message(), "device gone");
        assert_eq!(before.texts(), vec!["fan out".to_string()]);
        assert_eq!(after.texts(), vec!["fan out".to_string()]);
    }

    #[test]
    fn channel_property_accepts_a_list() {
        let a = Arc::new(MemorySink::default());
        let b = Arc::new(MemorySink::default());
        Directory::global().register_sink("splitter-test-a", a.clone());
        Directory::global().register_sink("splitter-test-b", b.clone());

        let splitter = SplitterSink::default();
        splitter
            .set_property("channel", "splitter-test-a, splitter-test-b;splitter-test-a")
            .unwrap();
        assert_eq!(splitter.len(), 2);

        let err = splitter
            .set_property("channel", "splitter-test-missing")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
