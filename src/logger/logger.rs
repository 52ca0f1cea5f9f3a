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

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use arc_swap::ArcSwap;

use crate::Error;
use crate::directory::Directory;
use crate::format::format_dump;
use crate::record::Level;
use crate::record::Priority;
use crate::record::Record;
use crate::record::RecordBuilder;
use crate::sink::SharedSink;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A named entry point that gates records by level and forwards them to a sink.
///
/// Loggers are obtained from a [`LoggerRegistry`](crate::logger::LoggerRegistry) and shared as
/// `Arc<Logger>`. The level check and the sink read never take a lock.
///
/// Errors returned by the sink while emitting are handed to the logger's [`Trap`]; the emission
/// methods never fail.
pub struct Logger {
    name: String,
    level: AtomicU8,
    sink: ArcSwap<Option<SharedSink>>,
    trap: ArcSwap<Box<dyn Trap>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("sink", &self.sink())
            .finish()
    }
}

impl Logger {
    pub(crate) fn new(name: impl Into<String>, level: Level, sink: Option<SharedSink>) -> Logger {
        let trap: Box<dyn Trap> = Box::new(DefaultTrap::default());
        Logger {
            name: name.into(),
            level: AtomicU8::new(level.get()),
            sink: ArcSwap::from_pointee(sink),
            trap: ArcSwap::from_pointee(trap),
        }
    }

    /// The dotted name of this logger. The root logger's name is empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a record of `priority` would pass the level gate.
    #[inline]
    pub fn is(&self, priority: Priority) -> bool {
        self.level.load(Ordering::Relaxed) >= priority.as_u8()
    }

    /// The current level threshold.
    pub fn level(&self) -> Level {
        Level::new(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Set the level threshold.
    ///
    /// Accepts a [`Level`] or a [`Priority`].
    pub fn set_level(&self, level: impl Into<Level>) {
        self.level.store(level.into().get(), Ordering::Relaxed);
    }

    /// The current sink, if any.
    pub fn sink(&self) -> Option<SharedSink> {
        let guard = self.sink.load();
        let sink: &Option<SharedSink> = &guard;
        sink.clone()
    }

    /// Replace the sink. `None` makes every emission a no-op.
    pub fn set_sink(&self, sink: Option<SharedSink>) {
        self.sink.store(Arc::new(sink));
    }

    /// Replace the trap that receives sink errors.
    ///
    /// Default to [`DefaultTrap`].
    pub fn set_trap(&self, trap: impl Into<Box<dyn Trap>>) {
        self.trap.store(Arc::new(trap.into()));
    }

    /// Set a named property: `level` (a level name or number) or `channel` (a sink name
    /// resolved through [`Directory::global`]).
    pub fn set_property(&self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "level" => {
                let level: Level = value.parse()?;
                self.set_level(level);
                Ok(())
            }
            "channel" => {
                let sink = Directory::global().sink_for_name(value)?;
                self.set_sink(Some(sink));
                Ok(())
            }
            _ => Err(Error::property_not_supported(name)),
        }
    }

    /// Read a named property. Only `level` is readable.
    pub fn get_property(&self, name: &str) -> Result<String, Error> {
        match name {
            "level" => Ok(self.level().to_string()),
            _ => Err(Error::property_not_supported(name)),
        }
    }

    /// Forward a record as-is if its priority passes the gate.
    pub fn log(&self, record: &Record) {
        if self.is(record.priority()) {
            self.deliver(record);
        }
    }

    /// Emit `text` at `priority`.
    pub fn emit(&self, priority: Priority, text: impl Into<String>) {
        if self.is(priority) {
            self.deliver(&Record::new(self.name.as_str(), text, priority));
        }
    }

    /// Emit `text` at `priority`, stamped with a call site.
    pub fn emit_at(
        &self,
        priority: Priority,
        text: impl Into<String>,
        file: &'static str,
        line: u32,
    ) {
        if self.is(priority) {
            let record = RecordBuilder::new(self.name.as_str(), text, priority)
                .file(file)
                .line(line)
                .build();
            self.deliver(&record);
        }
    }

    /// Emit the text produced by `text` at `priority`.
    ///
    /// The closure is not called when the gate is closed.
    pub fn emit_with<F, S>(&self, priority: Priority, text: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        if self.is(priority) {
            self.deliver(&Record::new(self.name.as_str(), text(), priority));
        }
    }

    /// Emit preformatted arguments at `priority`, stamped with a call site.
    ///
    /// This is what the logging macros expand to.
    pub fn emit_fmt(
        &self,
        priority: Priority,
        args: fmt::Arguments<'_>,
        file: &'static str,
        line: u32,
    ) {
        if self.is(priority) {
            let text = match args.as_str() {
                Some(text) => text.to_owned(),
                None => args.to_string(),
            };
            self.emit_at(priority, text, file, line);
        }
    }

    /// Emit `text` followed by a hex dump of `buffer`.
    pub fn dump(&self, priority: Priority, text: impl Into<String>, buffer: &[u8]) {
        if self.is(priority) {
            let mut text = text.into();
            format_dump(&mut text, buffer);
            self.deliver(&Record::new(self.name.as_str(), text, priority));
        }
    }

    /// Emit `text` at [`Priority::Fatal`].
    pub fn fatal(&self, text: impl Into<String>) {
        self.emit(Priority::Fatal, text);
    }

    /// Emit `text` at [`Priority::Critical`].
    pub fn critical(&self, text: impl Into<String>) {
        self.emit(Priority::Critical, text);
    }

    /// Emit `text` at [`Priority::Error`].
    pub fn error(&self, text: impl Into<String>) {
        self.emit(Priority::Error, text);
    }

    /// Emit `text` at [`Priority::Warning`].
    pub fn warning(&self, text: impl Into<String>) {
        self.emit(Priority::Warning, text);
    }

    /// Emit `text` at [`Priority::Notice`].
    pub fn notice(&self, text: impl Into<String>) {
        self.emit(Priority::Notice, text);
    }

    /// Emit `text` at [`Priority::Information`].
    pub fn information(&self, text: impl Into<String>) {
        self.emit(Priority::Information, text);
    }

    /// Emit `text` at [`Priority::Debug`].
    pub fn debug(&self, text: impl Into<String>) {
        self.emit(Priority::Debug, text);
    }

    /// Emit `text` at [`Priority::Trace`].
    pub fn trace(&self, text: impl Into<String>) {
        self.emit(Priority::Trace, text);
    }

    fn deliver(&self, record: &Record) {
        let guard = self.sink.load();
        if let Some(sink) = &**guard {
            if let Err(err) = sink.log(record) {
                self.trap.load().trap(&err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ErrorKind;
    use crate::sink::MemorySink;
    use crate::sink::Sink;

    fn logger_with_memory(level: Level) -> (Logger, Arc<MemorySink>) {
        let memory = Arc::new(MemorySink::default());
        let logger = Logger::new("app.core", level, Some(memory.clone()));
        (logger, memory)
    }

    #[test]
    fn gates_by_level() {
        let (logger, memory) = logger_with_memory(Level::WARNING);
        assert!(logger.is(Priority::Error));
        assert!(logger.is(Priority::Warning));
        assert!(!logger.is(Priority::Notice));

        logger.error("e");
        logger.warning("w");
        logger.notice("n");
        logger.debug("d");
        assert_eq!(memory.texts(), vec!["e".to_string(), "w".to_string()]);
    }

    #[test]
    fn level_none_disables_everything() {
        let (logger, memory) = logger_with_memory(Level::NONE);
        assert!(Priority::ALL.iter().all(|p| !logger.is(*p)));
        logger.fatal("gone");
        assert!(memory.is_empty());
    }

    #[test]
    fn records_carry_source_and_location() {
        let (logger, memory) = logger_with_memory(Level::TRACE);
        logger.emit_at(Priority::Debug, "here", "src/main.rs", 12);

        let records = memory.records();
        assert_eq!(records[0].source(), "app.core");
        assert_eq!(records[0].file(), Some("src/main.rs"));
        assert_eq!(records[0].line(), Some(12));
        assert_eq!(records[0].process_id(), std::process::id());
    }

    #[test]
    fn lazy_text_is_not_built_when_gated() {
        let (logger, memory) = logger_with_memory(Level::ERROR);
        let mut called = false;
        logger.emit_with(Priority::Debug, || {
            called = true;
            "expensive"
        });
        assert!(!called);

        logger.emit_with(Priority::Error, || "cheap enough");
        assert_eq!(memory.texts(), vec!["cheap enough".to_string()]);
    }

    #[test]
    fn log_gates_on_the_record_priority() {
        let (logger, memory) = logger_with_memory(Level::NOTICE);
        logger.log(&Record::new("elsewhere", "kept", Priority::Notice));
        logger.log(&Record::new("elsewhere", "dropped", Priority::Information));

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source(), "elsewhere");
    }

    #[test]
    fn dump_appends_hex() {
        let (logger, memory) = logger_with_memory(Level::DEBUG);
        logger.dump(Priority::Debug, "packet", &[0x41, 0x42]);
        logger.dump(Priority::Trace, "hidden", &[0x00]);
        assert_eq!(
            memory.texts(),
            vec![format!("packet\n0000  41 42{}AB", " ".repeat(45))]
        );
    }

    #[test]
    fn properties() {
        let (logger, _) = logger_with_memory(Level::INFORMATION);
        logger.set_property("level", "debug").unwrap();
        assert_eq!(logger.level(), Level::DEBUG);
        assert_eq!(logger.get_property("level").unwrap(), "debug");

        logger.set_property("level", "3").unwrap();
        assert_eq!(logger.level(), Level::ERROR);

        let err = logger.set_property("level", "verbose").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLevel);
        let err = logger.set_property("channel", "logger-test-missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = logger.get_property("channel").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PropertyNotSupported);
    }

    #[derive(Debug)]
    struct FailingSink;

    impl Sink for FailingSink {
        fn log(&self, _: &Record) -> Result<(), Error> {
            Err(Error::new(ErrorKind::Io, "broken pipe"))
        }
    }

    #[derive(Debug, Default)]
    struct CollectingTrap(Arc<Mutex<Vec<String>>>);

    impl Trap for CollectingTrap {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.message().to_string());
        }
    }

    #[test]
    fn sink_errors_go_to_the_trap() {
        let logger = Logger::new("app", Level::TRACE, Some(Arc::new(FailingSink)));
        let trapped = Arc::new(Mutex::new(vec![]));
        logger.set_trap(CollectingTrap(trapped.clone()));

        logger.error("first");
        logger.trace("second");
        assert_eq!(*trapped.lock().unwrap(), vec!["broken pipe", "broken pipe"]);
    }
}
