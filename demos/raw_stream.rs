//! Raw stream example
//!
//! Keeps recent records in memory and dumps them when an error occurs.
//!
//! Run with: cargo run --example raw_stream

use rust_bunyan::prelude::*;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct Timeout {
    after_ms: u64,
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream timed out after {}ms", self.after_ms)
    }
}

impl std::error::Error for Timeout {}

fn main() -> Result<()> {
    println!("=== Rust Bunyan - Raw Stream Example ===\n");

    let recent = Arc::new(RingBuffer::new(5));
    let log = Logger::new(
        LoggerOptions::new("raw_demo")
            .with_serializers(std_serializers::all())
            .add_stream(StreamSpec::raw(recent.clone()).with_level("trace"))
            .add_stream(StreamSpec::sink(ConsoleSink::stderr()).with_level("error")),
    )?;

    for step in 0..8 {
        log.debug(format!("step {}", step));
    }
    log.error_builder()
        .err(Timeout { after_ms: 1500 })
        .msg("request failed")
        .log();

    println!("Last {} records:", recent.len());
    for record in recent.records() {
        println!("  [{}] {}", record.level().upper_name(), record.msg());
    }

    Ok(())
}
