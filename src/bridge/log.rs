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

use crate::logger::LoggerRegistry;
use crate::record::Priority;
use crate::record::Record;
use crate::record::RecordBuilder;

struct LogCrateLogger(());

/// The logger receiving records for a `log` target: `a::b` maps to `a.b`.
fn logger_name(target: &str) -> String {
    target.replace("::", ".")
}

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let logger = LoggerRegistry::global().get(&logger_name(metadata.target()));
        logger.is(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let logger = LoggerRegistry::global().get(&logger_name(record.target()));
        let priority = Priority::from(record.level());
        if !logger.is(priority) {
            return;
        }

        logger.log(&convert(logger.name(), priority, record));
    }

    fn flush(&self) {
        let registry = LoggerRegistry::global();
        for name in registry.names() {
            if let Some(sink) = registry.has(&name).and_then(|logger| logger.sink()) {
                let _ = sink.flush();
            }
        }
    }
}

fn convert(source: &str, priority: Priority, record: &log::Record) -> Record {
    let mut builder = RecordBuilder::new(source, record.args().to_string(), priority);
    if let Some(file) = record.file_static() {
        builder = builder.file(file);
    }
    if let Some(line) = record.line() {
        builder = builder.line(line);
    }
    let mut converted = builder.build();

    struct ParamVisitor<'a>(&'a mut Record);

    impl<'kvs> log::kv::VisitSource<'kvs> for ParamVisitor<'_> {
        fn visit_pair(
            &mut self,
            key: log::kv::Key<'kvs>,
            value: log::kv::Value<'kvs>,
        ) -> Result<(), log::kv::Error> {
            self.0.set_param(key.as_str(), value.to_string());
            Ok(())
        }
    }

    let _ = record.key_values().visit(&mut ParamVisitor(&mut converted));
    converted
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_logger`] so that every record emitted through the `log`
/// macros is forwarded to the global [`LoggerRegistry`]. The target selects the logger, with
/// `::` replaced by `.`, and the logger's level and sink apply as usual.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// See [`try_setup_log_crate`].
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// logweave::bridge::setup_log_crate();
/// log::info!("routed to the registry");
/// ```
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "logweave::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
