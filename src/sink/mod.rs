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

//! Sinks consume log records.
//!
//! Any sink may wrap any other: a [`FormattingSink`] can forward into an
//! [`AsyncSink`](crate::asynchronous::AsyncSink) that forwards into a [`FileSink`], and so on.
//! Chains are assembled once at configuration time and shared through [`SharedSink`].

use std::fmt;
use std::sync::Arc;

use crate::Error;
use crate::record::Record;

mod file;
mod formatting;
mod memory;
mod null;
mod splitter;
mod stdio;

pub use self::file::FileSink;
pub use self::formatting::FormattingSink;
pub use self::memory::MemorySink;
pub use self::null::NullSink;
pub use self::splitter::SplitterSink;
pub use self::stdio::Stderr;
pub use self::stdio::Stdout;

/// A sink shared between loggers and composite sinks.
pub type SharedSink = Arc<dyn Sink>;

/// A destination for log records.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Deliver a log record.
    fn log(&self, record: &Record) -> Result<(), Error>;

    /// Acquire whatever resources the sink needs.
    ///
    /// Default to a no-op.
    fn open(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Release the resources acquired by [`open`](Sink::open).
    ///
    /// Default to a no-op.
    fn close(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Set a named property.
    ///
    /// Default to failing with [`ErrorKind::PropertyNotSupported`](crate::ErrorKind::PropertyNotSupported).
    fn set_property(&self, name: &str, value: &str) -> Result<(), Error> {
        let _ = value;
        Err(Error::property_not_supported(name))
    }

    /// Read a named property.
    ///
    /// Default to failing with [`ErrorKind::PropertyNotSupported`](crate::ErrorKind::PropertyNotSupported).
    fn get_property(&self, name: &str) -> Result<String, Error> {
        Err(Error::property_not_supported(name))
    }
}

impl<T: Sink> From<T> for Box<dyn Sink> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
