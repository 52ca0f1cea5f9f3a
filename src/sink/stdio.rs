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

use std::io::Write;

use crate::Error;
use crate::formatter::Formatter;
use crate::formatter::PlainTextFormatter;
use crate::record::Record;
use crate::sink::Sink;

/// A sink that prints log records to stdout.
///
/// # Examples
///
/// ```
/// use logweave::formatter::PlainTextFormatter;
/// use logweave::sink::Stdout;
///
/// let sink = Stdout::default().with_formatter(PlainTextFormatter::default().no_color());
/// ```
#[derive(Debug)]
pub struct Stdout {
    formatter: Box<dyn Formatter>,
}

impl Default for Stdout {
    fn default() -> Self {
        Self {
            formatter: Box::new(PlainTextFormatter::default()),
        }
    }
}

impl Stdout {
    /// Set the formatter for the [`Stdout`] sink.
    ///
    /// Default to [`PlainTextFormatter`].
    pub fn with_formatter(mut self, formatter: impl Into<Box<dyn Formatter>>) -> Self {
        self.formatter = formatter.into();
        self
    }
}

impl Sink for Stdout {
    fn log(&self, record: &Record) -> Result<(), Error> {
        let mut text = self.formatter.format(record)?;
        text.push('\n');
        std::io::stdout()
            .write_all(text.as_bytes())
            .map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)
    }
}

/// A sink that prints log records to stderr.
///
/// # Examples
///
/// ```
/// use logweave::sink::Stderr;
///
/// let sink = Stderr::default();
/// ```
#[derive(Debug)]
pub struct Stderr {
    formatter: Box<dyn Formatter>,
}

impl Default for Stderr {
    fn default() -> Self {
        Self {
            formatter: Box::new(PlainTextFormatter::default()),
        }
    }
}

impl Stderr {
    /// Set the formatter for the [`Stderr`] sink.
    ///
    /// Default to [`PlainTextFormatter`].
    pub fn with_formatter(mut self, formatter: impl Into<Box<dyn Formatter>>) -> Self {
        self.formatter = formatter.into();
        self
    }
}

impl Sink for Stderr {
    fn log(&self, record: &Record) -> Result<(), Error> {
        let mut text = self.formatter.format(record)?;
        text.push('\n');
        std::io::stderr()
            .write_all(text.as_bytes())
            .map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::from_io_error)
    }
}
