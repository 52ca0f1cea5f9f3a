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

use std::fmt::Write;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Error;
use crate::formatter::Formatter;
use crate::record::Priority;
use crate::record::Record;

/// A formatter that renders a record as one line of plain text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00       ERROR [Svc.Net] net.rs:51 connection refused peer=10.0.0.1
/// 2024-08-11T22:44:57.172219+08:00     WARNING [Svc.Net] net.rs:52 retrying
/// 2024-08-11T22:44:57.172276+08:00 INFORMATION [Svc] connected
/// ```
///
/// The location is omitted when the record carries no source file. Parameters follow the text
/// as `key=value` pairs.
///
/// With the `colored` feature the priority is colored; call
/// [`no_color`](PlainTextFormatter::no_color) to turn that off.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use logweave::formatter::PlainTextFormatter;
///
/// let formatter = PlainTextFormatter::default().timezone(TimeZone::UTC);
/// ```
#[derive(Debug, Clone)]
pub struct PlainTextFormatter {
    no_color: bool,
    timezone: TimeZone,
    timestamp_format: Option<fn(Timestamp, &TimeZone) -> String>,
}

impl Default for PlainTextFormatter {
    fn default() -> Self {
        Self {
            no_color: false,
            timezone: TimeZone::system(),
            timestamp_format: None,
        }
    }
}

impl PlainTextFormatter {
    /// Disable colored output.
    ///
    /// No effect unless the `colored` feature is enabled.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Set the timezone for timestamps.
    ///
    /// Defaults to the system timezone if not set.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// Set a user-defined timestamp format function.
    ///
    /// Default to formatting the timestamp with offset as ISO 8601 with microseconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::Timestamp;
    /// use jiff::tz::TimeZone;
    /// use logweave::formatter::PlainTextFormatter;
    ///
    /// let formatter = PlainTextFormatter::default()
    ///     .timestamp_format(|ts, _| ts.strftime("%Y-%m-%d %H:%M:%S").to_string());
    /// ```
    pub fn timestamp_format(mut self, format: fn(Timestamp, &TimeZone) -> String) -> Self {
        self.timestamp_format = Some(format);
        self
    }

    #[cfg(feature = "colored")]
    fn format_priority(&self, priority: Priority) -> String {
        use colored::Color;
        use colored::Colorize;

        if self.no_color {
            return format!("{priority:>11}");
        }

        let color = match priority {
            Priority::Fatal | Priority::Critical => Color::BrightRed,
            Priority::Error => Color::Red,
            Priority::Warning => Color::Yellow,
            Priority::Notice | Priority::Information => Color::Green,
            Priority::Debug => Color::Blue,
            Priority::Trace => Color::Magenta,
        };
        format!("{:>11}", priority.as_str())
            .color(color)
            .to_string()
    }

    #[cfg(not(feature = "colored"))]
    fn format_priority(&self, priority: Priority) -> String {
        let _ = self.no_color;
        format!("{priority:>11}")
    }
}

fn default_timestamp_format(ts: Timestamp, tz: &TimeZone) -> String {
    let offset = tz.to_offset(ts);
    format!("{:.6}", ts.display_with_offset(offset))
}

impl Formatter for PlainTextFormatter {
    fn format(&self, record: &Record) -> Result<String, Error> {
        let ts = record.time();
        let mut text = match self.timestamp_format {
            Some(format) => format(ts, &self.timezone),
            None => default_timestamp_format(ts, &self.timezone),
        };

        let priority = self.format_priority(record.priority());
        let source = record.source();
        write!(&mut text, " {priority} [{source}]").map_err(Error::from_fmt_error)?;

        if record.file().is_some() {
            let file = record.filename();
            let line = record.line().unwrap_or_default();
            write!(&mut text, " {file}:{line}").map_err(Error::from_fmt_error)?;
        }

        write!(&mut text, " {}", record.text()).map_err(Error::from_fmt_error)?;
        for (key, value) in record.params() {
            write!(&mut text, " {key}={value}").map_err(Error::from_fmt_error)?;
        }

        Ok(text)
    }
}
