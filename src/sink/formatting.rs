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

use std::sync::Mutex;

use crate::Error;
use crate::directory::Directory;
use crate::formatter::SharedFormatter;
use crate::record::Record;
use crate::sink::SharedSink;
use crate::sink::Sink;

/// A sink that renders each record with a formatter and forwards the result downstream.
///
/// The forwarded record keeps every field of the original except its text, which is replaced
/// by the rendered output. Without a formatter records pass through unchanged.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logweave::formatter::CustomFormatter;
/// use logweave::record::Priority;
/// use logweave::record::Record;
/// use logweave::sink::FormattingSink;
/// use logweave::sink::MemorySink;
/// use logweave::sink::Sink;
///
/// let memory = Arc::new(MemorySink::default());
/// let formatter = CustomFormatter::new(|r: &Record| Ok(format!("[{}] {}", r.priority(), r.text())));
/// let sink = FormattingSink::new(Some(Arc::new(formatter)), memory.clone());
///
/// sink.log(&Record::new("app", "ready", Priority::Notice)).unwrap();
/// assert_eq!(memory.texts(), vec!["[NOTICE] ready".to_string()]);
/// ```
#[derive(Debug)]
pub struct FormattingSink {
    formatter: Mutex<Option<SharedFormatter>>,
    downstream: Mutex<SharedSink>,
}

impl FormattingSink {
    /// Create a formatting sink forwarding to `downstream`.
    pub fn new(formatter: Option<SharedFormatter>, downstream: SharedSink) -> Self {
        Self {
            formatter: Mutex::new(formatter),
            downstream: Mutex::new(downstream),
        }
    }

    /// The current formatter, if any.
    pub fn formatter(&self) -> Option<SharedFormatter> {
        self.formatter
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the formatter.
    pub fn set_formatter(&self, formatter: Option<SharedFormatter>) {
        *self.formatter.lock().unwrap_or_else(|e| e.into_inner()) = formatter;
    }

    /// The current downstream sink.
    pub fn downstream(&self) -> SharedSink {
        self.downstream
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the downstream sink.
    pub fn set_downstream(&self, downstream: SharedSink) {
        *self.downstream.lock().unwrap_or_else(|e| e.into_inner()) = downstream;
    }
}

impl Sink for FormattingSink {
    fn log(&self, record: &Record) -> Result<(), Error> {
        let formatter = self.formatter();
        let downstream = self.downstream();
        match formatter {
            Some(formatter) => {
                let text = formatter.format(record)?;
                downstream.log(&record.with_text(text))
            }
            None => downstream.log(record),
        }
    }

    fn open(&self) -> Result<(), Error> {
        self.downstream().open()
    }

    fn close(&self) -> Result<(), Error> {
        self.downstream().close()
    }

    fn flush(&self) -> Result<(), Error> {
        self.downstream().flush()
    }

    fn set_property(&self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "channel" => {
                let sink = Directory::global().sink_for_name(value)?;
                self.set_downstream(sink);
                Ok(())
            }
            "formatter" => {
                let formatter = Directory::global().formatter_for_name(value)?;
                self.set_formatter(Some(formatter));
                Ok(())
            }
            _ => Err(Error::property_not_supported(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ErrorKind;
    use crate::formatter::CustomFormatter;
    use crate::record::Priority;
    use crate::record::RecordBuilder;
    use crate::sink::MemorySink;

    fn upper() -> SharedFormatter {
        Arc::new(CustomFormatter::new(|r: &Record| Ok(r.text().to_uppercase())))
    }

    #[test]
    fn replaces_text_and_keeps_metadata() {
        let memory = Arc::new(MemorySink::default());
        let sink = FormattingSink::new(Some(upper()), memory.clone());

        let record = RecordBuilder::new("svc.db", "slow query", Priority::Warning)
            .file("src/db.rs")
            .line(7)
            .param("ms", "250")
            .build();
        sink.log(&record).unwrap();

        let received = memory.records();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].text(), "SLOW QUERY");
        assert_eq!(received[0].source(), "svc.db");
        assert_eq!(received[0].priority(), Priority::Warning);
        assert_eq!(received[0].time(), record.time());
        assert_eq!(received[0].line(), Some(7));
        assert_eq!(received[0].param("ms"), Some("250"));
    }

    #[test]
    fn passes_through_without_formatter() {
        let memory = Arc::new(MemorySink::default());
        let sink = FormattingSink::new(None, memory.clone());
        sink.log(&Record::new("app", "as is", Priority::Debug)).unwrap();
        assert_eq!(memory.texts(), vec!["as is".to_string()]);
    }

    #[test]
    fn resolves_properties_through_the_directory() {
        let first = Arc::new(MemorySink::default());
        let second = Arc::new(MemorySink::default());
        Directory::global().register_sink("formatting-test-second", second.clone());
        Directory::global().register_formatter("formatting-test-upper", upper());

        let sink = FormattingSink::new(None, first.clone());
        sink.set_property("channel", "formatting-test-second").unwrap();
        sink.set_property("formatter", "formatting-test-upper").unwrap();
        sink.log(&Record::new("app", "moved", Priority::Information)).unwrap();

        assert!(first.is_empty());
        assert_eq!(second.texts(), vec!["MOVED".to_string()]);

        let err = sink
            .set_property("channel", "formatting-test-missing")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = sink.set_property("pattern", "%t").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyNotSupported);
    }
}
