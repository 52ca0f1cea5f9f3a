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

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use crate::Error;
use crate::logger::Logger;
use crate::record::Level;
use crate::sink::SharedSink;

type LoggerMap = BTreeMap<String, Arc<Logger>>;

/// A name-ordered collection of loggers.
///
/// Names are dotted paths. A logger created on demand copies the level and sink of its nearest
/// registered ancestor, or of the root logger when there is none. Intermediate ancestors are
/// not created. After creation a logger is independent: only the bulk setters
/// ([`set_level`](LoggerRegistry::set_level) and friends) change a whole subtree.
///
/// # Examples
///
/// ```
/// use logweave::logger::LoggerRegistry;
/// use logweave::record::Level;
///
/// let registry = LoggerRegistry::new();
/// registry.root().set_level(Level::DEBUG);
///
/// let db = registry.get("app.db");
/// assert_eq!(db.level(), Level::DEBUG);
/// assert_eq!(registry.names(), vec!["", "app.db"]);
/// ```
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: Mutex<LoggerMap>,
}

impl LoggerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static LoggerRegistry {
        static REGISTRY: OnceLock<LoggerRegistry> = OnceLock::new();
        REGISTRY.get_or_init(LoggerRegistry::new)
    }

    fn loggers(&self) -> MutexGuard<'_, LoggerMap> {
        self.loggers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the logger named `name`, creating it if necessary.
    pub fn get(&self, name: &str) -> Arc<Logger> {
        resolve(&mut self.loggers(), name)
    }

    /// Same as [`get`](LoggerRegistry::get) without taking the registry lock.
    ///
    /// The exclusive borrow rules out concurrent use, which makes this suitable for
    /// single-threaded setup phases.
    pub fn get_unlocked(&mut self, name: &str) -> Arc<Logger> {
        let loggers = self.loggers.get_mut().unwrap_or_else(|e| e.into_inner());
        resolve(loggers, name)
    }

    /// Return the logger named `name` if it is registered. Never creates.
    pub fn has(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers().get(name).cloned()
    }

    /// Create the logger named `name` with an explicit sink and level.
    ///
    /// Any previously registered logger with the same name is replaced. Handles to the old
    /// logger stay valid but are no longer reachable through the registry.
    pub fn create(
        &self,
        name: &str,
        sink: Option<SharedSink>,
        level: impl Into<Level>,
    ) -> Arc<Logger> {
        let logger = Arc::new(Logger::new(name, level.into(), sink));
        self.loggers().insert(name.to_owned(), logger.clone());
        logger
    }

    /// The root logger.
    pub fn root(&self) -> Arc<Logger> {
        self.get("")
    }

    /// Set the level of `name` and of every registered logger below it.
    ///
    /// An empty `name` addresses every logger. Loggers created later are not affected except
    /// through inheritance at creation.
    pub fn set_level(&self, name: &str, level: impl Into<Level>) {
        let level = level.into();
        for logger in subtree(&self.loggers(), name) {
            logger.set_level(level);
        }
    }

    /// Set the sink of `name` and of every registered logger below it.
    pub fn set_sink(&self, name: &str, sink: Option<SharedSink>) {
        for logger in subtree(&self.loggers(), name) {
            logger.set_sink(sink.clone());
        }
    }

    /// Set a property on `name` and on every registered logger below it.
    ///
    /// # Errors
    ///
    /// Stop at and return the first error raised by a logger. Loggers visited earlier keep the
    /// new value.
    pub fn set_property(&self, name: &str, property: &str, value: &str) -> Result<(), Error> {
        for logger in subtree(&self.loggers(), name) {
            logger.set_property(property, value)?;
        }
        Ok(())
    }

    /// Names of every registered logger, in lexicographic order.
    pub fn names(&self) -> Vec<String> {
        self.loggers().keys().cloned().collect()
    }

    /// Remove the logger named `name`. Descendants are kept.
    pub fn destroy(&self, name: &str) {
        self.loggers().remove(name);
    }

    /// Remove every logger.
    ///
    /// Outstanding handles keep working with their last level and sink, detached from the
    /// registry. A later [`get`](LoggerRegistry::get) starts from a fresh root.
    pub fn shutdown(&self) {
        self.loggers().clear();
    }
}

fn resolve(loggers: &mut LoggerMap, name: &str) -> Arc<Logger> {
    if let Some(logger) = loggers.get(name) {
        return logger.clone();
    }

    let logger = if name.is_empty() {
        Logger::new("", Level::INFORMATION, None)
    } else {
        let parent = parent(loggers, name);
        Logger::new(name, parent.level(), parent.sink())
    };

    let logger = Arc::new(logger);
    loggers.insert(name.to_owned(), logger.clone());
    logger
}

fn parent(loggers: &mut LoggerMap, name: &str) -> Arc<Logger> {
    let mut current = name;
    while let Some(pos) = current.rfind('.') {
        current = &current[..pos];
        if let Some(logger) = loggers.get(current) {
            return logger.clone();
        }
    }
    resolve(loggers, "")
}

fn in_subtree(candidate: &str, name: &str) -> bool {
    name.is_empty()
        || candidate
            .strip_prefix(name)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

fn subtree(loggers: &LoggerMap, name: &str) -> Vec<Arc<Logger>> {
    loggers
        .iter()
        .filter(|(candidate, _)| in_subtree(candidate, name))
        .map(|(_, logger)| logger.clone())
        .collect()
}
