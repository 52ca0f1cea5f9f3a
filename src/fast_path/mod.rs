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

//! Delivery through one shared backend thread and a fixed-size lock-free ring.
//!
//! Every [`FastPathSink`] in the process sends to the same [`Backend`]. Producers never take a
//! lock: a record is copied into a slot of a preallocated ring and formatting and I/O happen
//! on the backend thread. When the ring is full the record is dropped and counted per sink;
//! the next record that gets through is preceded by a drop notice.
//!
//! The ring size is fixed when the backend starts. Call [`Backend::start_with_capacity`] before
//! the first sink is created to choose it.

mod backend;
mod sink;

pub use self::backend::Backend;
pub use self::backend::DEFAULT_CAPACITY;
pub use self::sink::FastPathSink;
