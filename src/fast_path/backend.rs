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

use std::cell::Cell;
use std::sync::Arc;
use std::sync::OnceLock;
use std::thread;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::TrySendError;

use crate::Error;
use crate::ErrorKind;
use crate::formatter::SharedFormatter;
use crate::record::Record;
use crate::sink::SharedSink;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// The ring size used when no capacity was chosen explicitly.
pub const DEFAULT_CAPACITY: usize = 8192;

static BACKEND: OnceLock<Backend> = OnceLock::new();

thread_local! {
    static ON_BACKEND: Cell<bool> = const { Cell::new(false) };
}

/// Whether the caller is the backend thread itself.
pub(super) fn on_backend_thread() -> bool {
    ON_BACKEND.with(Cell::get)
}

pub(super) enum Message {
    Log {
        record: Record,
        sink: SharedSink,
        formatter: Option<SharedFormatter>,
        trap: Arc<dyn Trap>,
    },
    Flush {
        sink: SharedSink,
        trap: Arc<dyn Trap>,
        done: Sender<()>,
    },
}

/// The process-wide backend thread behind every [`FastPathSink`](super::FastPathSink).
#[derive(Debug)]
pub struct Backend {
    sender: Sender<Message>,
    capacity: usize,
}

impl Backend {
    /// Return the backend, starting it with [`DEFAULT_CAPACITY`] if it is not running yet.
    pub fn global() -> &'static Backend {
        BACKEND.get_or_init(|| Backend::spawn(DEFAULT_CAPACITY))
    }

    /// Start the backend with a ring of `capacity` slots.
    ///
    /// # Errors
    ///
    /// Return [`ErrorKind::InvalidArgument`] if `capacity` is zero, and
    /// [`ErrorKind::Configuration`] if the backend is already running with a different
    /// capacity.
    pub fn start_with_capacity(capacity: usize) -> Result<&'static Backend, Error> {
        if capacity == 0 {
            return Err(Error::invalid_argument("ring capacity must be positive", capacity));
        }

        let backend = BACKEND.get_or_init(|| Backend::spawn(capacity));
        if backend.capacity != capacity {
            let err = Error::new(ErrorKind::Configuration, "backend already started")
                .with_context("capacity", backend.capacity);
            return Err(err);
        }
        Ok(backend)
    }

    /// The number of slots in the ring.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of messages waiting for the backend thread.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    fn spawn(capacity: usize) -> Backend {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let spawned = thread::Builder::new()
            .name("logweave-fast-path".to_string())
            .spawn(move || run(receiver));
        if let Err(err) = spawned {
            // the receiver is gone with the closure, so every send reports a disconnect
            let err = Error::new(ErrorKind::Unexpected, "failed to spawn fast path backend")
                .with_source(err);
            DefaultTrap::default().trap(&err);
        }
        Backend { sender, capacity }
    }

    pub(super) fn try_send(&self, message: Message) -> Result<bool, Error> {
        match self.sender.try_send(message) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(disconnected()),
        }
    }

    pub(super) fn send(&self, message: Message) -> Result<(), Error> {
        self.sender.send(message).map_err(|_| disconnected())
    }
}

fn disconnected() -> Error {
    Error::new(ErrorKind::Unexpected, "fast path backend is not running")
}

fn run(receiver: Receiver<Message>) {
    ON_BACKEND.with(|flag| flag.set(true));
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Log {
                record,
                sink,
                formatter,
                trap,
            } => {
                let result = match formatter {
                    Some(formatter) => formatter
                        .format(&record)
                        .and_then(|text| sink.log(&record.with_text(text))),
                    None => sink.log(&record),
                };
                if let Err(err) = result {
                    trap.trap(&err);
                }
            }
            Message::Flush { sink, trap, done } => {
                if let Err(err) = sink.flush() {
                    trap.trap(&err);
                }
                let _ = done.send(());
            }
        }
    }
}
