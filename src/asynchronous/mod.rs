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

//! Off-thread delivery through a bounded queue.
//!
//! An [`AsyncSink`] hands every record to a [`NotificationQueue`](crate::queue::NotificationQueue)
//! and returns immediately. A dedicated worker thread takes records off the queue and forwards
//! them to the downstream sink. When the queue is full new records are dropped and counted; the
//! next record that gets through is preceded by a warning saying how many were lost.

use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::record::Priority;
use crate::record::Record;

mod sink;
mod worker;

pub use self::sink::AsyncBuilder;
pub use self::sink::AsyncSink;

/// The scheduling priority of a worker thread.
///
/// On Linux the priority is applied as a niceness offset when the worker starts. Raising it
/// above [`Normal`](ThreadPriority::Normal) usually needs extra privileges; a failure goes to
/// the sink's trap and the worker keeps running. Elsewhere the value is recorded only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ThreadPriority {
    /// Niceness +10.
    Lowest,
    /// Niceness +5.
    Low,
    /// The niceness inherited from the spawning thread.
    #[default]
    Normal,
    /// Niceness -5.
    High,
    /// Niceness -10.
    Highest,
}

impl ThreadPriority {
    /// Return the property value naming this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadPriority::Lowest => "lowest",
            ThreadPriority::Low => "low",
            ThreadPriority::Normal => "normal",
            ThreadPriority::High => "high",
            ThreadPriority::Highest => "highest",
        }
    }

    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    fn niceness(&self) -> i32 {
        match self {
            ThreadPriority::Lowest => 10,
            ThreadPriority::Low => 5,
            ThreadPriority::Normal => 0,
            ThreadPriority::High => -5,
            ThreadPriority::Highest => -10,
        }
    }
}

impl fmt::Display for ThreadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreadPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowest" => Ok(ThreadPriority::Lowest),
            "low" => Ok(ThreadPriority::Low),
            "normal" => Ok(ThreadPriority::Normal),
            "high" => Ok(ThreadPriority::High),
            "highest" => Ok(ThreadPriority::Highest),
            _ => Err(Error::invalid_argument("not a valid thread priority", s)),
        }
    }
}

/// The warning queued ahead of the first record accepted after `dropped` were lost.
pub(crate) fn drop_notice(source: &str, dropped: usize) -> Record {
    Record::new(source, format!("{dropped} messages dropped"), Priority::Warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn parses_thread_priorities() {
        assert_eq!("lowest".parse::<ThreadPriority>().unwrap(), ThreadPriority::Lowest);
        assert_eq!("HIGH".parse::<ThreadPriority>().unwrap(), ThreadPriority::High);
        assert_eq!(ThreadPriority::Highest.to_string(), "highest");

        let err = "realtime".parse::<ThreadPriority>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn drop_notice_counts() {
        let notice = drop_notice("app.net", 7);
        assert_eq!(notice.text(), "7 messages dropped");
        assert_eq!(notice.source(), "app.net");
        assert_eq!(notice.priority(), Priority::Warning);
    }
}
