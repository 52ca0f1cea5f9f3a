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

use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::record::Record;
use crate::sink::Sink;

/// A sink that keeps every record it receives in memory.
///
/// Useful in tests and for in-process inspection of what a logger chain produced.
///
/// # Examples
///
/// ```
/// use logweave::record::Priority;
/// use logweave::record::Record;
/// use logweave::sink::MemorySink;
/// use logweave::sink::Sink;
///
/// let sink = MemorySink::default();
/// sink.log(&Record::new("app", "hello", Priority::Information)).unwrap();
/// assert_eq!(sink.texts(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Record>>,
}

impl MemorySink {
    fn records_mut(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// A copy of every record received so far, in arrival order.
    pub fn records(&self) -> Vec<Record> {
        self.records_mut().clone()
    }

    /// The texts of every record received so far, in arrival order.
    pub fn texts(&self) -> Vec<String> {
        self.records_mut()
            .iter()
            .map(|record| record.text().to_string())
            .collect()
    }

    /// The number of records received so far.
    pub fn len(&self) -> usize {
        self.records_mut().len()
    }

    /// Whether no record has been received.
    pub fn is_empty(&self) -> bool {
        self.records_mut().is_empty()
    }

    /// Forget every record received so far.
    pub fn clear(&self) {
        self.records_mut().clear();
    }
}

impl Sink for MemorySink {
    fn log(&self, record: &Record) -> Result<(), Error> {
        self.records_mut().push(record.clone());
        Ok(())
    }
}
