//! File logging example
//!
//! Demonstrates a rendered console stream and a JSON file stream with
//! different levels on one logger.
//!
//! Run with: cargo run --example file_logging

use rust_bunyan::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Bunyan - File Logging Example ===\n");

    let console = ConsoleSink::stdout().with_render(RenderOptions::new(OutputMode::Short));
    let log = Logger::new(
        LoggerOptions::new("file_demo")
            .add_stream(StreamSpec::sink(console).with_name("console").with_level("info"))
            .add_stream(StreamSpec::path("application.log").with_name("file").with_level("debug")),
    )?;

    log.on_error(|err| eprintln!("destination failed: {}", err.error));

    println!("1. Logging to both console and file:");
    log.info("Application started");
    log.debug("Loading configuration... (file only)");
    log.warn("Using default settings for some options");
    log.error("Failed to load optional plugin");

    println!("\n2. Quieting the console while the file keeps everything:");
    log.set_stream_level("console", "warn")?;
    for i in 1..=5 {
        log.info(format!("Processing item {}/5", i));
        if i == 3 {
            log.warn("Item 3 took longer than expected");
        }
    }

    log.info("All operations completed");
    log.close()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full JSON output");

    Ok(())
}
