//! Basic logger usage example
//!
//! Demonstrates JSON records on stdout, per-call fields and child loggers.
//!
//! Run with: cargo run --example basic_usage

use rust_bunyan::prelude::*;
use rust_bunyan::{fields, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Bunyan - Basic Usage Example ===\n");

    // Defaults to one stdout stream at INFO
    let log = Logger::new(LoggerOptions::new("myapp").with_level("trace"))?;

    println!("1. Logging at different levels:");
    log.trace("This is a trace message");
    log.debug("This is a debug message");
    log.info("This is an info message");
    log.warn("This is a warning message");
    log.error("This is an error message");
    log.fatal("This is a fatal message");

    println!("\n2. Raising the level - trace and debug won't show:");
    log.set_level("info")?;
    log.trace("Trace message (hidden)");
    log.debug("Debug message (hidden)");
    log.info("Info message (visible)");

    println!("\n3. Format arguments and call fields:");
    info!(log, "listening on port %d", 8080);
    warn!(log, { "user_id" => 42, "attempt" => 3 }, "login retry for %s", "ann");

    println!("\n4. Child loggers add context:");
    let request_log = log.child(LoggerOptions::child().with_field("req_id", "abc-123"))?;
    request_log.info("handling request");
    let fast = request_log.child_fast(fields! { "step" => "auth" });
    fast.info("checking credentials");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
