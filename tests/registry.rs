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
use logweave::LoggerRegistry;
use logweave::Priority;
use logweave::Record;
use logweave::SharedSink;
use logweave::Sink;
use logweave::sink::MemorySink;
use logweave::sink::NullSink;
use logweave::sink::SplitterSink;

#[test]
fn gate_matches_numeric_comparison() {
    let registry = LoggerRegistry::new();
    let logger = registry.get("gate");
    for level in 0..=8u8 {
        logger.set_level(Level::new(level).unwrap());
        for priority in Priority::ALL {
            assert_eq!(
                logger.is(priority),
                level >= priority.as_u8(),
                "level {level} priority {priority}"
            );
        }
    }

    logger.set_level(Level::NONE);
    assert!(!logger.is(Priority::Fatal));
}

#[test]
fn only_open_priorities_reach_the_sink() {
    let registry = LoggerRegistry::new();
    let memory = Arc::new(MemorySink::default());
    let logger = registry.create("Svc.Net", Some(memory.clone()), Level::INFORMATION);

    logger.emit(Priority::Debug, "x");
    assert!(memory.is_empty());

    logger.emit(Priority::Information, "y");
    let records = memory.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source(), "Svc.Net");
    assert_eq!(records[0].text(), "y");
}

#[test]
fn null_sink_discards_without_failing() {
    let registry = LoggerRegistry::new();
    let memory = Arc::new(MemorySink::default());
    let splitter = Arc::new(SplitterSink::default());
    splitter.add(Arc::new(NullSink::default()));
    splitter.add(memory.clone());
    let logger = registry.create("Svc.Net", Some(splitter.clone()), Level::TRACE);

    logger.emit(Priority::Debug, "x");
    logger.emit(Priority::Information, "y");
    assert_eq!(memory.texts(), vec!["x", "y"]);
    assert_eq!(splitter.len(), 2);
    assert!(
        splitter
            .log(&Record::new("Svc.Net", "z", Priority::Trace))
            .is_ok()
    );
}

#[test]
fn children_snapshot_the_parent_at_creation() {
    let registry = LoggerRegistry::new();
    let memory: SharedSink = Arc::new(MemorySink::default());

    let parent = registry.get("A");
    parent.set_level(Level::DEBUG);
    parent.set_sink(Some(memory.clone()));

    let child = registry.get("A.B");
    assert_eq!(child.level(), Level::DEBUG);
    assert!(Arc::ptr_eq(&child.sink().unwrap(), &memory));

    parent.set_level(Level::ERROR);
    parent.set_sink(None);
    assert_eq!(child.level(), Level::DEBUG);
    assert!(child.sink().is_some());
}

#[test]
fn unrelated_loggers_inherit_from_root() {
    let registry = LoggerRegistry::new();
    registry.root().set_level(Level::CRITICAL);
    assert_eq!(registry.get("x.y.z").level(), Level::CRITICAL);
}

#[test]
fn bulk_setters_respect_dot_boundaries() {
    let registry = LoggerRegistry::new();
    for name in ["A", "A.B", "A.B.C", "AB", "B"] {
        registry.create(name, None, Level::INFORMATION);
    }

    registry.set_level("A", Level::TRACE);
    assert_eq!(registry.get("A").level(), Level::TRACE);
    assert_eq!(registry.get("A.B").level(), Level::TRACE);
    assert_eq!(registry.get("A.B.C").level(), Level::TRACE);
    assert_eq!(registry.get("AB").level(), Level::INFORMATION);
    assert_eq!(registry.get("B").level(), Level::INFORMATION);

    let memory: SharedSink = Arc::new(MemorySink::default());
    registry.set_sink("A.B", Some(memory.clone()));
    assert!(registry.get("A").sink().is_none());
    assert!(Arc::ptr_eq(&registry.get("A.B.C").sink().unwrap(), &memory));

    registry.set_property("A", "level", "warning").unwrap();
    assert_eq!(registry.get("A.B.C").level(), Level::WARNING);
    assert_eq!(registry.get("AB").level(), Level::INFORMATION);
}

#[test]
fn empty_name_addresses_every_logger() {
    let registry = LoggerRegistry::new();
    for name in ["a", "b.c", "d"] {
        registry.get(name);
    }
    registry.set_level("", Level::NONE);
    for name in registry.names() {
        assert_eq!(registry.get(&name).level(), Level::NONE, "{name}");
    }
}

#[test]
fn bulk_set_property_stops_at_first_error() {
    let registry = LoggerRegistry::new();
    registry.get("svc.a");
    let err = registry.set_property("svc", "level", "chatty").unwrap_err();
    assert_eq!(err.kind(), logweave::ErrorKind::InvalidLevel);
    let err = registry.set_property("svc", "format", "%t").unwrap_err();
    assert_eq!(err.kind(), logweave::ErrorKind::PropertyNotSupported);
}

#[test]
fn names_are_sorted() {
    let registry = LoggerRegistry::new();
    assert!(registry.names().is_empty());
    for name in ["zeta", "alpha.beta", "alpha", "mid"] {
        registry.get(name);
    }
    assert_eq!(
        registry.names(),
        vec!["", "alpha", "alpha.beta", "mid", "zeta"]
    );
}

#[test]
fn has_never_creates() {
    let registry = LoggerRegistry::new();
    assert!(registry.has("ghost").is_none());
    assert!(registry.names().is_empty());
    let logger = registry.get("ghost");
    assert!(Arc::ptr_eq(&registry.has("ghost").unwrap(), &logger));
}

#[test]
fn shutdown_detaches_outstanding_handles() {
    let registry = LoggerRegistry::new();
    let memory = Arc::new(MemorySink::default());
    let logger = registry.create("svc", Some(memory.clone()), Level::DEBUG);

    registry.shutdown();
    assert!(registry.names().is_empty());

    logger.debug("still works");
    assert_eq!(memory.texts(), vec!["still works".to_string()]);

    let fresh = registry.get("svc");
    assert!(!Arc::ptr_eq(&fresh, &logger));
    assert_eq!(fresh.level(), Level::INFORMATION);
    assert!(fresh.sink().is_none());
}

#[test]
fn global_shorthands_share_one_registry() {
    let logger = logweave::get("registry-test.global");
    assert!(Arc::ptr_eq(&logger, &LoggerRegistry::global().get("registry-test.global")));
    assert!(Arc::ptr_eq(&logweave::root(), &LoggerRegistry::global().root()));
}
