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

//! Log record, priority and level threshold.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use jiff::Timestamp;

use crate::Error;

/// The severity of a log record.
///
/// Lower numeric values are more severe: `Fatal` is 1 and `Trace` is 8.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Priority {
    /// A fatal error. The application will most likely terminate.
    Fatal = 1,
    /// A critical error. The application might not be able to continue running.
    Critical = 2,
    /// An error. An operation did not complete successfully.
    Error = 3,
    /// A warning. An operation completed with an unexpected result.
    Warning = 4,
    /// A notice, which is an information with just a higher priority.
    Notice = 5,
    /// An informational message, usually denoting the successful completion of an operation.
    Information = 6,
    /// A debugging message.
    Debug = 7,
    /// A tracing message. This is the lowest priority.
    Trace = 8,
}

impl Priority {
    /// All priorities, most severe first.
    pub const ALL: [Priority; 8] = [
        Priority::Fatal,
        Priority::Critical,
        Priority::Error,
        Priority::Warning,
        Priority::Notice,
        Priority::Information,
        Priority::Debug,
        Priority::Trace,
    ];

    /// Return the string representation of the `Priority`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Fatal => "FATAL",
            Priority::Critical => "CRITICAL",
            Priority::Error => "ERROR",
            Priority::Warning => "WARNING",
            Priority::Notice => "NOTICE",
            Priority::Information => "INFORMATION",
            Priority::Debug => "DEBUG",
            Priority::Trace => "TRACE",
        }
    }

    /// Return the numeric value, 1 for `Fatal` through 8 for `Trace`.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Convert a numeric value in `1..=8` back to a `Priority`.
    pub fn from_u8(value: u8) -> Option<Priority> {
        Priority::ALL.get(usize::from(value).checked_sub(1)?).copied()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Priority, Self::Err> {
        for priority in Priority::ALL {
            if s.eq_ignore_ascii_case(priority.as_str()) {
                return Ok(priority);
            }
        }

        Err(Error::invalid_level(s))
    }
}

impl From<log::Level> for Priority {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Priority::Error,
            log::Level::Warn => Priority::Warning,
            log::Level::Info => Priority::Information,
            log::Level::Debug => Priority::Debug,
            log::Level::Trace => Priority::Trace,
        }
    }
}

/// The inclusive threshold of a logger.
///
/// A logger with level `L` dispatches a record of priority `p` iff `L >= p`. Level 0
/// ([`Level::NONE`]) disables the logger entirely.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Level(u8);

impl Level {
    /// Logging disabled.
    pub const NONE: Level = Level(0);
    /// Only [`Priority::Fatal`] records pass.
    pub const FATAL: Level = Level(1);
    /// Up to [`Priority::Critical`].
    pub const CRITICAL: Level = Level(2);
    /// Up to [`Priority::Error`].
    pub const ERROR: Level = Level(3);
    /// Up to [`Priority::Warning`].
    pub const WARNING: Level = Level(4);
    /// Up to [`Priority::Notice`].
    pub const NOTICE: Level = Level(5);
    /// Up to [`Priority::Information`].
    pub const INFORMATION: Level = Level(6);
    /// Up to [`Priority::Debug`].
    pub const DEBUG: Level = Level(7);
    /// Everything passes.
    pub const TRACE: Level = Level(8);

    /// Create a level from its numeric value.
    ///
    /// Fails with [`ErrorKind::InvalidLevel`](crate::ErrorKind::InvalidLevel) outside `0..=8`;
    /// out-of-range values are never clamped.
    pub fn new(value: u8) -> Result<Level, Error> {
        if value <= Level::TRACE.0 {
            Ok(Level(value))
        } else {
            Err(Error::invalid_level(value))
        }
    }

    /// Return the numeric value of this level.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Whether a record of the given priority passes this threshold.
    pub fn allows(&self, priority: Priority) -> bool {
        self.0 >= priority.as_u8()
    }

    /// Return the symbolic name of this level, lower-case.
    pub fn as_str(&self) -> &'static str {
        match Priority::from_u8(self.0) {
            None => "none",
            Some(Priority::Fatal) => "fatal",
            Some(Priority::Critical) => "critical",
            Some(Priority::Error) => "error",
            Some(Priority::Warning) => "warning",
            Some(Priority::Notice) => "notice",
            Some(Priority::Information) => "information",
            Some(Priority::Debug) => "debug",
            Some(Priority::Trace) => "trace",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFORMATION
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<Priority> for Level {
    fn from(priority: Priority) -> Self {
        Level(priority.as_u8())
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Parse `none`, a symbolic priority name (case-insensitive) or a number in `0..=8`.
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Level::NONE);
        }

        if let Ok(priority) = s.parse::<Priority>() {
            return Ok(priority.into());
        }

        match s.trim().parse::<u8>() {
            Ok(value) => Level::new(value),
            Err(_) => Err(Error::invalid_level(s)),
        }
    }
}

/// One log event with its full context.
///
/// `source`, `text`, `priority` and `time` are fixed once the record is built. Parameters may
/// be added afterwards.
#[derive(Clone, Debug)]
pub struct Record {
    source: String,
    text: String,
    priority: Priority,
    time: Timestamp,
    process_id: u32,
    thread_id: u64,
    thread_name: String,
    file: Option<&'static str>,
    line: Option<u32>,
    params: BTreeMap<String, String>,
}

impl Record {
    /// Create a record stamped with the current time, process and thread.
    pub fn new(source: impl Into<String>, text: impl Into<String>, priority: Priority) -> Record {
        RecordBuilder::new(source, text, priority).build()
    }

    /// The name of the logger that produced the record.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The severity.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// The observed time.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The id of the emitting process.
    pub fn process_id(&self) -> u32 {
        self.process_id
    }

    /// The process-local numeric id of the emitting thread.
    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    /// The name of the emitting thread, empty for unnamed threads.
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// The source file containing the call site.
    pub fn file(&self) -> Option<&'static str> {
        self.file
    }

    /// The file name part of [`Record::file`].
    pub fn filename(&self) -> &'static str {
        self.file
            .map(std::path::Path::new)
            .and_then(std::path::Path::file_name)
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or_default()
    }

    /// The line containing the call site.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The attached parameters, ordered by key.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Look up one parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Attach a parameter, replacing any previous value for the key.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove every parameter.
    pub fn clear_params(&mut self) {
        self.params.clear();
    }

    /// A copy of this record sharing all metadata but carrying a different text.
    pub fn with_text(&self, text: impl Into<String>) -> Record {
        Record {
            source: self.source.clone(),
            text: text.into(),
            priority: self.priority,
            time: self.time,
            process_id: self.process_id,
            thread_id: self.thread_id,
            thread_name: self.thread_name.clone(),
            file: self.file,
            line: self.line,
            params: self.params.clone(),
        }
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Start a record stamped with the current time, process and thread.
    pub fn new(source: impl Into<String>, text: impl Into<String>, priority: Priority) -> Self {
        let (thread_id, thread_name) = current_thread();
        RecordBuilder {
            record: Record {
                source: source.into(),
                text: text.into(),
                priority,
                time: Timestamp::now(),
                process_id: std::process::id(),
                thread_id,
                thread_name,
                file: None,
                line: None,
                params: BTreeMap::new(),
            },
        }
    }

    /// Set [`time`](Record::time).
    pub fn time(mut self, time: Timestamp) -> Self {
        self.record.time = time;
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: &'static str) -> Self {
        self.record.file = Some(file);
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: u32) -> Self {
        self.record.line = Some(line);
        self
    }

    /// Add a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.set_param(key, value);
        self
    }

    /// Invoke the builder and return a `Record`.
    pub fn build(self) -> Record {
        self.record
    }
}

fn current_thread() -> (u64, String) {
    static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

    thread_local! {
        static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
    }

    let id = THREAD_ID.with(|id| *id);
    let name = std::thread::current()
        .name()
        .map(str::to_owned)
        .unwrap_or_default();
    (id, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn priorities_are_ordered_by_severity() {
        assert!(Priority::Fatal < Priority::Trace);
        assert_eq!(Priority::Fatal.as_u8(), 1);
        assert_eq!(Priority::Trace.as_u8(), 8);
        assert_eq!(Priority::from_u8(4), Some(Priority::Warning));
        assert_eq!(Priority::from_u8(0), None);
        assert_eq!(Priority::from_u8(9), None);
    }

    #[test]
    fn level_gates_every_priority() {
        for value in 0..=8 {
            let level = Level::new(value).unwrap();
            for priority in Priority::ALL {
                assert_eq!(level.allows(priority), value >= priority.as_u8());
            }
        }
        assert!(!Level::NONE.allows(Priority::Fatal));
    }

    #[test]
    fn level_parses_symbols_and_numbers() {
        assert_eq!("none".parse::<Level>().unwrap(), Level::NONE);
        assert_eq!("Debug".parse::<Level>().unwrap(), Level::DEBUG);
        assert_eq!("INFORMATION".parse::<Level>().unwrap(), Level::INFORMATION);
        assert_eq!("1".parse::<Level>().unwrap(), Level::FATAL);
        assert_eq!("8".parse::<Level>().unwrap(), Level::TRACE);
        assert_eq!("0".parse::<Level>().unwrap(), Level::NONE);

        for bad in ["9", "-1", "verbose", ""] {
            let err = bad.parse::<Level>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidLevel, "{bad}");
        }
        assert_eq!(Level::new(9).unwrap_err().kind(), ErrorKind::InvalidLevel);
    }

    #[test]
    fn with_text_keeps_metadata() {
        let mut record = RecordBuilder::new("Svc.Net", "raw", Priority::Notice)
            .file("src/net.rs")
            .line(42)
            .build();
        record.set_param("peer", "10.0.0.1");

        let rendered = record.with_text("rendered");
        assert_eq!(rendered.text(), "rendered");
        assert_eq!(rendered.source(), "Svc.Net");
        assert_eq!(rendered.priority(), Priority::Notice);
        assert_eq!(rendered.time(), record.time());
        assert_eq!(rendered.thread_id(), record.thread_id());
        assert_eq!(rendered.filename(), "net.rs");
        assert_eq!(rendered.line(), Some(42));
        assert_eq!(rendered.param("peer"), Some("10.0.0.1"));
    }

    #[test]
    fn thread_ids_are_stable_per_thread() {
        let a = Record::new("a", "x", Priority::Trace);
        let b = Record::new("a", "y", Priority::Trace);
        assert_eq!(a.thread_id(), b.thread_id());

        let other = std::thread::spawn(|| Record::new("a", "z", Priority::Trace).thread_id())
            .join()
            .unwrap();
        assert_ne!(a.thread_id(), other);
    }
}
