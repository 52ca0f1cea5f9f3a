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

//! Runs in its own process so the backend can be started with a tiny ring.

use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use logweave::Error;
use logweave::ErrorKind;
use logweave::Priority;
use logweave::Record;
use logweave::Sink;
use logweave::fast_path::Backend;
use logweave::fast_path::FastPathSink;
use logweave::sink::MemorySink;

const CAPACITY: usize = 16;

#[derive(Debug, Default)]
struct GatedSink {
    received: MemorySink,
    open: Mutex<bool>,
    opened: Condvar,
}

impl GatedSink {
    fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

impl Sink for GatedSink {
    fn log(&self, record: &Record) -> Result<(), Error> {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
        drop(open);
        self.received.log(record)
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn full_ring_drops_and_reports() {
    let backend = Backend::start_with_capacity(CAPACITY).unwrap();
    assert_eq!(backend.capacity(), CAPACITY);
    let err = Backend::start_with_capacity(CAPACITY * 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(Backend::start_with_capacity(0).is_err());

    let gated = Arc::new(GatedSink::default());
    let sink = FastPathSink::with_backend(backend, gated.clone());

    // the backend takes this one and blocks in the downstream
    sink.log(&Record::new("fast", "blocker", Priority::Information)).unwrap();
    wait_until(|| backend.pending() == 0);

    for i in 0..CAPACITY + 4 {
        sink.log(&Record::new("fast", i.to_string(), Priority::Information)).unwrap();
    }
    assert_eq!(sink.dropped(), 4);

    gated.release();
    wait_until(|| backend.pending() == 0);

    sink.log(&Record::new("fast.late", "after", Priority::Error)).unwrap();
    assert_eq!(sink.dropped(), 0);
    sink.flush().unwrap();

    let records = gated.received.records();
    let texts: Vec<_> = records.iter().map(|r| r.text().to_string()).collect();
    let mut expected = vec!["blocker".to_string()];
    expected.extend((0..CAPACITY).map(|i| i.to_string()));
    expected.push("4 messages dropped".to_string());
    expected.push("after".to_string());
    assert_eq!(texts, expected);
    assert_eq!(records[CAPACITY + 1].priority(), Priority::Warning);
    assert_eq!(records[CAPACITY + 1].source(), "fast.late");
}
