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

/// Emit a formatted message through a logger at the given priority.
///
/// The level gate is checked before the message arguments are evaluated, so a disabled call
/// costs one atomic load and evaluates nothing else. The call site's file and line are
/// attached to the record.
///
/// # Examples
///
/// ```
/// use logweave::logger::LoggerRegistry;
/// use logweave::record::Priority;
///
/// let registry = LoggerRegistry::new();
/// let logger = registry.get("app");
/// logweave::log!(logger, Priority::Notice, "listening on {}", 8080);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $priority:expr, $($arg:tt)+) => {{
        let logger: &$crate::logger::Logger = &$logger;
        let priority: $crate::record::Priority = $priority;
        if logger.is(priority) {
            logger.emit_fmt(priority, format_args!($($arg)+), file!(), line!());
        }
    }};
}

/// Emit a formatted message at [`Priority::Fatal`](crate::record::Priority::Fatal).
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Fatal, $($arg)+)
    };
}

/// Emit a formatted message at [`Priority::Critical`](crate::record::Priority::Critical).
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Critical, $($arg)+)
    };
}

/// Emit a formatted message at [`Priority::Error`](crate::record::Priority::Error).
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Error, $($arg)+)
    };
}

/// Emit a formatted message at [`Priority::Warning`](crate::record::Priority::Warning).
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Warning, $($arg)+)
    };
}

/// Emit a formatted message at [`Priority::Notice`](crate::record::Priority::Notice).
#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Notice, $($arg)+)
    };
}

/// Emit a formatted message at [`Priority::Information`](crate::record::Priority::Information).
#[macro_export]
macro_rules! information {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Information, $($arg)+)
    };
}

/// Emit a formatted message at [`Priority::Debug`](crate::record::Priority::Debug).
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Debug, $($arg)+)
    };
}

/// Emit a formatted message at [`Priority::Trace`](crate::record::Priority::Trace).
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::record::Priority::Trace, $($arg)+)
    };
}
