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
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::asynchronous::ThreadPriority;
use crate::queue::NotificationQueue;
use crate::record::Record;
use crate::sink::SharedSink;
use crate::trap::Trap;

/// State shared between an [`AsyncSink`](super::AsyncSink) and its worker thread.
#[derive(Debug)]
pub(super) struct Shared {
    pub(super) queue: NotificationQueue,
    pub(super) running: AtomicBool,
    downstream: Mutex<Option<SharedSink>>,
    trap: Box<dyn Trap>,
}

impl Shared {
    pub(super) fn new(
        capacity: usize,
        downstream: Option<SharedSink>,
        trap: Box<dyn Trap>,
    ) -> Shared {
        Shared {
            queue: NotificationQueue::with_capacity(capacity),
            running: AtomicBool::new(false),
            downstream: Mutex::new(downstream),
            trap,
        }
    }

    pub(super) fn downstream(&self) -> Option<SharedSink> {
        self.downstream
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(super) fn set_downstream(&self, downstream: Option<SharedSink>) {
        *self.downstream.lock().unwrap_or_else(|e| e.into_inner()) = downstream;
    }

    pub(super) fn trap(&self, err: &Error) {
        self.trap.trap(err);
    }
}

pub(super) struct Worker {
    shared: Arc<Shared>,
    priority: ThreadPriority,
}

impl Worker {
    pub(super) fn new(shared: Arc<Shared>, priority: ThreadPriority) -> Self {
        Self { shared, priority }
    }

    pub(super) fn run(self) {
        let Self { shared, priority } = self;

        if let Err(err) = apply_priority(priority) {
            shared.trap(&err);
        }

        loop {
            match shared.queue.dequeue_blocking() {
                Some(record) => deliver(&shared, &record),
                None if shared.running.load(Ordering::Acquire) => continue,
                None => break,
            }
        }

        // records that raced with the stop request
        while let Some(record) = shared.queue.try_dequeue() {
            deliver(&shared, &record);
        }
    }
}

fn deliver(shared: &Shared, record: &Record) {
    // the downstream lock is released before the record is written
    let Some(downstream) = shared.downstream() else {
        return;
    };
    if let Err(err) = downstream.log(record) {
        shared.trap(&err);
    }
}

#[cfg(target_os = "linux")]
fn apply_priority(priority: ThreadPriority) -> Result<(), Error> {
    if priority == ThreadPriority::Normal {
        return Ok(());
    }

    // SAFETY: gettid has no preconditions and setpriority only reads its arguments.
    let ret = unsafe {
        let tid = libc::syscall(libc::SYS_gettid) as libc::id_t;
        libc::setpriority(libc::PRIO_PROCESS, tid, priority.niceness())
    };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(Error::from_io_error(err).with_context("priority", priority));
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn apply_priority(_: ThreadPriority) -> Result<(), Error> {
    Ok(())
}
