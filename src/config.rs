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

//! Apply flat `key = value` settings to loggers and sinks.
//!
//! Keys take one of two forms:
//!
//! * `logger.<name>.<property>` sets a property on the named logger and every registered logger
//!   below it. The name may itself contain dots; `root` or an empty name selects the root
//!   logger. A `channel` value names a sink in the configurator's directory.
//! * `sink.<name>.<property>` sets a property on the sink registered under `<name>` in the
//!   directory.
//!
//! Reading settings from files is left to the application.

use crate::Error;
use crate::directory::Directory;
use crate::logger::LoggerRegistry;

/// Applies settings to a registry and a directory.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use logweave::config::Configurator;
/// use logweave::directory::Directory;
/// use logweave::logger::LoggerRegistry;
/// use logweave::record::Level;
/// use logweave::sink::MemorySink;
///
/// let registry = LoggerRegistry::new();
/// let directory = Directory::new();
/// directory.register_sink("memory", Arc::new(MemorySink::default()));
///
/// Configurator::new(&registry, &directory)
///     .apply([
///         ("logger.root.level", "warning"),
///         ("logger.app.db.level", "debug"),
///         ("logger.app.db.channel", "memory"),
///     ])
///     .unwrap();
///
/// assert_eq!(registry.root().level(), Level::WARNING);
/// assert_eq!(registry.get("app.db").level(), Level::DEBUG);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Configurator<'a> {
    registry: &'a LoggerRegistry,
    directory: &'a Directory,
}

impl Configurator<'static> {
    /// A configurator for the global registry and directory.
    pub fn global() -> Configurator<'static> {
        Configurator::new(LoggerRegistry::global(), Directory::global())
    }
}

impl<'a> Configurator<'a> {
    /// Create a configurator for `registry` and `directory`.
    pub fn new(registry: &'a LoggerRegistry, directory: &'a Directory) -> Self {
        Self {
            registry,
            directory,
        }
    }

    /// Apply every entry in order.
    ///
    /// # Errors
    ///
    /// Stop at and return the first failing entry. Entries before it stay applied.
    pub fn apply<I, K, V>(&self, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in entries {
            self.set(key.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// Apply one entry.
    ///
    /// # Errors
    ///
    /// Return [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) for a malformed
    /// key, or whatever the logger or sink reports for the property.
    pub fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let key = key.trim();
        let value = value.trim();
        let result = if let Some(rest) = key.strip_prefix("logger.") {
            let (name, property) = split_property(key, rest)?;
            let name = if name == "root" { "" } else { name };
            self.registry.get(name);
            match property {
                "channel" => self.directory.sink_for_name(value).map(|sink| {
                    self.registry.set_sink(name, Some(sink));
                }),
                _ => self.registry.set_property(name, property, value),
            }
        } else if let Some(rest) = key.strip_prefix("sink.") {
            let (name, property) = split_property(key, rest)?;
            self.directory
                .sink_for_name(name)
                .and_then(|sink| sink.set_property(property, value))
        } else {
            Err(Error::invalid_argument("unknown configuration key", key))
        };
        result.map_err(|err| err.with_context("key", key))
    }
}

fn split_property<'k>(key: &str, rest: &'k str) -> Result<(&'k str, &'k str), Error> {
    match rest.rsplit_once('.') {
        Some((name, property)) if !property.is_empty() => Ok((name, property)),
        _ => Err(Error::invalid_argument("configuration key has no property", key)),
    }
}
