//! Stress tests for concurrent emission
//!
//! These tests verify:
//! - Every record reaches its destinations when many threads log at once
//! - Lines written to a shared file never interleave
//! - Child loggers created concurrently stay isolated from each other
//! - Metrics stay exact under contention

use rust_bunyan::prelude::*;
use rust_bunyan::fields;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

/// Every thread's records land in the file as whole JSON lines
#[test]
fn test_file_lines_never_interleave() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("stress.log");

    let log = Arc::new(
        Logger::new(LoggerOptions::new("stress").add_stream(StreamSpec::path(&path))).unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    log.info_with(fields! { "thread" => t, "seq" => i }, format!("payload {}", i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }
    log.flush().unwrap();

    let content = std::fs::read_to_string(&path).expect("Failed to read log file");
    let mut seen = HashSet::new();
    for line in content.lines() {
        let record: serde_json::Value =
            serde_json::from_str(line).unwrap_or_else(|e| panic!("torn line {:?}: {}", line, e));
        let key = (record["thread"].as_u64().unwrap(), record["seq"].as_u64().unwrap());
        assert!(seen.insert(key), "duplicate record {:?}", key);
    }
    assert_eq!(seen.len(), THREADS * PER_THREAD);
}

/// Per-thread children keep their own fields while sharing destinations
#[test]
fn test_concurrent_children_are_isolated() {
    let ring = Arc::new(RingBuffer::new(THREADS * PER_THREAD));
    let log = Arc::new(
        Logger::new(LoggerOptions::new("stress").add_stream(StreamSpec::raw(ring.clone()))).unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let child = log
                    .child(LoggerOptions::child().with_field("worker", t))
                    .expect("child options are valid");
                let fast = child.child_fast(fields! { "fast" => true });
                for i in 0..PER_THREAD {
                    if i % 2 == 0 {
                        child.info("tick");
                    } else {
                        fast.info("tock");
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let records = ring.records();
    assert_eq!(records.len(), THREADS * PER_THREAD);
    for record in &records {
        assert!(record.get("worker").is_some());
        let fast = record.get("fast").is_some();
        assert_eq!(fast, record.msg() == "tock", "fields leaked between siblings");
    }
    assert!(log.fields().get("worker").is_none());
}

/// A bounded ring keeps exactly its limit regardless of contention
#[test]
fn test_ring_buffer_bound_under_load() {
    let limit = 64;
    let ring = Arc::new(RingBuffer::new(limit));
    let log = Arc::new(
        Logger::new(LoggerOptions::new("stress").add_stream(StreamSpec::raw(ring.clone()))).unwrap(),
    );

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let log = &log;
            scope.spawn(move || {
                for i in 0..PER_THREAD {
                    log.warn(format!("burst {}", i));
                }
            });
        }
    });

    assert_eq!(ring.len(), limit);
}

/// Counters add up exactly after a concurrent mix of enabled and disabled calls
#[test]
fn test_metrics_exact_under_contention() {
    let ring = Arc::new(RingBuffer::new(10));
    let errors = Arc::new(RingBuffer::new(10));
    let log = Arc::new(
        Logger::new(
            LoggerOptions::new("stress")
                .add_stream(StreamSpec::raw(ring.clone()).with_level("info"))
                .add_stream(StreamSpec::raw(errors.clone()).with_level("error")),
        )
        .unwrap(),
    );

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let log = &log;
            scope.spawn(move || {
                for _ in 0..PER_THREAD {
                    log.debug("dropped");
                    log.info("kept once");
                    log.error("kept twice");
                }
            });
        }
    });

    let metrics = log.metrics();
    let calls = (THREADS * PER_THREAD) as u64;
    assert_eq!(metrics.filtered(), calls);
    assert_eq!(metrics.records_emitted(), calls * 2);
    assert_eq!(metrics.writes(), calls * 3);
    assert_eq!(metrics.write_failures(), 0);
    // No text destinations, so nothing was stringified
    assert_eq!(metrics.stringify_count(), 0);
}

/// Changing levels while other threads log never loses the invariant
#[test]
fn test_level_changes_during_logging() {
    let ring = Arc::new(RingBuffer::new(THREADS * PER_THREAD));
    let log = Arc::new(
        Logger::new(
            LoggerOptions::new("stress").add_stream(StreamSpec::raw(ring.clone()).with_level("info")),
        )
        .unwrap(),
    );

    thread::scope(|scope| {
        let writer = &log;
        scope.spawn(move || {
            for i in 0..PER_THREAD {
                let level = if i % 2 == 0 { Level::DEBUG } else { Level::WARN };
                writer.set_stream_level(0usize, level).unwrap();
            }
        });
        for _ in 0..THREADS {
            let log = &log;
            scope.spawn(move || {
                for _ in 0..PER_THREAD {
                    log.info("maybe");
                }
            });
        }
    });

    assert_eq!(log.level(), Level::WARN);
    assert_eq!(log.stream_levels(), vec![Level::WARN]);
    assert!(ring.len() <= THREADS * PER_THREAD);
}
