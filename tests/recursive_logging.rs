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

use std::sync::Arc;

use logweave::Level;
use logweave::Record;
use logweave::Sink;
use logweave::asynchronous::AsyncSink;
use logweave::formatter::CustomFormatter;
use logweave::sink::FormattingSink;
use logweave::sink::MemorySink;
use logweave::sink::SplitterSink;

struct Thing<'a>(&'a str);

impl std::fmt::Display for Thing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        log::debug!("formatting wrapping ({})", self.0);
        logweave::debug!(logweave::get("recursive.inner"), "inner ({})", self.0);
        f.write_str(self.0)
    }
}

// logging from inside a message's Display impl must not deadlock
#[test]
fn logging_while_formatting_works() {
    let direct = Arc::new(MemorySink::default());
    let deferred = Arc::new(MemorySink::default());
    let async_sink = Arc::new(AsyncSink::new(deferred.clone()));

    let splitter = Arc::new(SplitterSink::default());
    splitter.add(direct.clone());
    splitter.add(async_sink.clone());

    let formatter = CustomFormatter::new(|record: &Record| {
        Ok(format!("{} [{}] {}", record.source(), record.priority(), record.text()))
    });
    let chain = Arc::new(FormattingSink::new(Some(Arc::new(formatter)), splitter));

    let root = logweave::root();
    root.set_level(Level::TRACE);
    root.set_sink(Some(chain));
    logweave::bridge::setup_log_crate();

    log::info!("I'm logging {}!", Thing("aha"));
    async_sink.close().unwrap();

    let expected = vec![
        "recursive_logging [DEBUG] formatting wrapping (aha)".to_string(),
        "recursive.inner [DEBUG] inner (aha)".to_string(),
        "recursive_logging [INFORMATION] I'm logging aha!".to_string(),
    ];
    assert_eq!(direct.texts(), expected);
    assert_eq!(deferred.texts(), expected);
}
