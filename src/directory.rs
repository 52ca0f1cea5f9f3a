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

//! Name-based lookup of sinks and formatters.
//!
//! Properties that refer to another sink or formatter by name, such as `channel` or
//! `formatter`, resolve through [`Directory::global`].

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use crate::Error;
use crate::ErrorKind;
use crate::formatter::SharedFormatter;
use crate::sink::SharedSink;

/// A registry of named sinks and formatters.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logweave::directory::Directory;
/// use logweave::sink::NullSink;
///
/// let directory = Directory::new();
/// directory.register_sink("null", Arc::new(NullSink::default()));
/// assert!(directory.sink_for_name("null").is_ok());
/// assert!(directory.sink_for_name("missing").is_err());
/// ```
#[derive(Debug, Default)]
pub struct Directory {
    sinks: Mutex<BTreeMap<String, SharedSink>>,
    formatters: Mutex<BTreeMap<String, SharedFormatter>>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide directory.
    pub fn global() -> &'static Directory {
        static DIRECTORY: OnceLock<Directory> = OnceLock::new();
        DIRECTORY.get_or_init(Directory::new)
    }

    fn sinks(&self) -> MutexGuard<'_, BTreeMap<String, SharedSink>> {
        self.sinks.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn formatters(&self) -> MutexGuard<'_, BTreeMap<String, SharedFormatter>> {
        self.formatters.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `sink` under `name`, returning the sink it replaced.
    pub fn register_sink(&self, name: impl Into<String>, sink: SharedSink) -> Option<SharedSink> {
        self.sinks().insert(name.into(), sink)
    }

    /// Look up a sink by name.
    ///
    /// # Errors
    ///
    /// Return [`ErrorKind::NotFound`] if no sink is registered under `name`.
    pub fn sink_for_name(&self, name: &str) -> Result<SharedSink, Error> {
        self.sinks().get(name).cloned().ok_or_else(|| {
            Error::new(ErrorKind::NotFound, "sink not found").with_context("name", name)
        })
    }

    /// Remove the sink registered under `name`.
    pub fn unregister_sink(&self, name: &str) -> Option<SharedSink> {
        self.sinks().remove(name)
    }

    /// Register `formatter` under `name`, returning the formatter it replaced.
    pub fn register_formatter(
        &self,
        name: impl Into<String>,
        formatter: SharedFormatter,
    ) -> Option<SharedFormatter> {
        self.formatters().insert(name.into(), formatter)
    }

    /// Look up a formatter by name.
    ///
    /// # Errors
    ///
    /// Return [`ErrorKind::NotFound`] if no formatter is registered under `name`.
    pub fn formatter_for_name(&self, name: &str) -> Result<SharedFormatter, Error> {
        self.formatters().get(name).cloned().ok_or_else(|| {
            Error::new(ErrorKind::NotFound, "formatter not found").with_context("name", name)
        })
    }

    /// Remove the formatter registered under `name`.
    pub fn unregister_formatter(&self, name: &str) -> Option<SharedFormatter> {
        self.formatters().remove(name)
    }

    /// Names of every registered sink, in lexicographic order.
    pub fn sink_names(&self) -> Vec<String> {
        self.sinks().keys().cloned().collect()
    }

    /// Remove every sink and formatter.
    pub fn clear(&self) {
        self.sinks().clear();
        self.formatters().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::formatter::PlainTextFormatter;
    use crate::sink::MemorySink;
    use crate::sink::NullSink;

    #[test]
    fn registers_and_replaces_sinks() {
        let directory = Directory::new();
        let first: SharedSink = Arc::new(NullSink::default());
        let second: SharedSink = Arc::new(MemorySink::default());

        assert!(directory.register_sink("out", first.clone()).is_none());
        let replaced = directory.register_sink("out", second.clone()).unwrap();
        assert!(Arc::ptr_eq(&replaced, &first));
        assert!(Arc::ptr_eq(&directory.sink_for_name("out").unwrap(), &second));

        directory.unregister_sink("out");
        let err = directory.sink_for_name("out").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn formatters_are_separate_from_sinks() {
        let directory = Directory::new();
        directory.register_formatter("plain", Arc::new(PlainTextFormatter::default()));
        assert!(directory.formatter_for_name("plain").is_ok());
        assert!(directory.sink_for_name("plain").is_err());

        directory.clear();
        assert!(directory.formatter_for_name("plain").is_err());
    }
}
