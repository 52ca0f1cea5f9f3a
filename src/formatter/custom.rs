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

use crate::Error;
use crate::formatter::Formatter;
use crate::record::Record;

type FormatFunction = dyn Fn(&Record) -> Result<String, Error> + Send + Sync + 'static;

/// A formatter backed by a user-provided function.
///
/// ```rust
/// use logweave::formatter::CustomFormatter;
/// use logweave::record::Record;
///
/// let formatter = CustomFormatter::new(|record: &Record| {
///     Ok(format!("{} - {}", record.priority(), record.text()))
/// });
/// ```
pub struct CustomFormatter {
    f: Box<FormatFunction>,
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CustomFormatter {{ ... }}")
    }
}

impl CustomFormatter {
    /// Create a formatter from a function.
    pub fn new(
        format: impl Fn(&Record) -> Result<String, Error> + Send + Sync + 'static,
    ) -> Self {
        CustomFormatter {
            f: Box::new(format),
        }
    }
}

impl Formatter for CustomFormatter {
    fn format(&self, record: &Record) -> Result<String, Error> {
        (self.f)(record)
    }
}
