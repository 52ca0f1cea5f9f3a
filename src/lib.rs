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

//! Logweave is a hierarchical logging pipeline with composable sinks and asynchronous delivery.
//!
//! # Overview
//!
//! Loggers live in a [`LoggerRegistry`] and are addressed by dotted names such as `app.db`. Each
//! logger has a level threshold and an optional [`Sink`]. A new logger copies the level and
//! sink of its nearest registered ancestor; afterwards the registry's bulk setters update a
//! whole subtree at once.
//!
//! Sinks compose: a [`FormattingSink`](sink::FormattingSink) renders text, a
//! [`SplitterSink`](sink::SplitterSink) fans out, an [`AsyncSink`](asynchronous::AsyncSink)
//! moves delivery to a worker thread behind a bounded queue, and a
//! [`FastPathSink`](fast_path::FastPathSink) hands records to one shared backend thread
//! through a lock-free ring.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use logweave::asynchronous::AsyncSink;
//! use logweave::record::Level;
//! use logweave::sink::Stderr;
//!
//! let sink = Arc::new(AsyncSink::new(Arc::new(Stderr::default())));
//! logweave::root().set_sink(Some(sink));
//! logweave::root().set_level(Level::DEBUG);
//!
//! let logger = logweave::get("app.db");
//! logweave::information!(logger, "connected to {}", "primary");
//! logweave::debug!(logger, "pool size {}", 8);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::sync::Arc;

pub mod asynchronous;
pub mod bridge;
pub mod config;
pub mod directory;
pub mod error;
pub mod fast_path;
pub mod format;
pub mod formatter;
pub mod logger;
pub mod queue;
pub mod record;
pub mod sink;
pub mod trap;

mod macros;

pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::formatter::Formatter;
pub use self::logger::Logger;
pub use self::logger::LoggerRegistry;
pub use self::record::Level;
pub use self::record::Priority;
pub use self::record::Record;
pub use self::sink::SharedSink;
pub use self::sink::Sink;

/// Return the logger named `name` from the global registry, creating it if necessary.
pub fn get(name: &str) -> Arc<Logger> {
    LoggerRegistry::global().get(name)
}

/// Return the root logger of the global registry.
pub fn root() -> Arc<Logger> {
    LoggerRegistry::global().root()
}
