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

//! Formatters render a [`Record`] to text.

use std::fmt;
use std::sync::Arc;

use crate::Error;
use crate::record::Record;

mod custom;
mod plain_text;

pub use self::custom::CustomFormatter;
pub use self::plain_text::PlainTextFormatter;

/// A formatter shared between sinks.
pub type SharedFormatter = Arc<dyn Formatter>;

/// Renders a log record to text.
pub trait Formatter: fmt::Debug + Send + Sync + 'static {
    /// Format a log record.
    fn format(&self, record: &Record) -> Result<String, Error>;
}

impl<T: Formatter> From<T> for Box<dyn Formatter> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
