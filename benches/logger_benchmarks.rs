//! Criterion benchmarks for rust_bunyan

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_bunyan::prelude::*;
use rust_bunyan::{fields, format_message, info, render_line};
use std::sync::Arc;

/// Text sink that throws lines away
struct NullSink;

impl Sink for NullSink {
    fn write(&self, unit: &WriteUnit) -> Result<()> {
        black_box(unit);
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn text_logger(level: &str) -> Logger {
    Logger::new(LoggerOptions::new("bench").add_stream(StreamSpec::sink(NullSink).with_level(level)))
        .expect("valid options")
}

fn raw_logger() -> (Logger, Arc<RingBuffer>) {
    let ring = Arc::new(RingBuffer::new(100));
    let log = Logger::new(LoggerOptions::new("bench").add_stream(StreamSpec::raw(ring.clone())))
        .expect("valid options");
    (log, ring)
}

// ============================================================================
// Logger Creation Benchmarks
// ============================================================================

fn bench_logger_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("new", |b| {
        b.iter(|| black_box(text_logger("info")));
    });

    let parent = text_logger("info");
    group.bench_function("child", |b| {
        b.iter(|| {
            let child = parent
                .child(LoggerOptions::child().with_field("req_id", "abc-123"))
                .unwrap();
            black_box(child)
        });
    });

    group.bench_function("child_fast", |b| {
        b.iter(|| black_box(parent.child_fast(fields! { "req_id" => "abc-123" })));
    });

    group.finish();
}

// ============================================================================
// Emission Benchmarks
// ============================================================================

fn bench_disabled_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("disabled_levels");
    group.throughput(Throughput::Elements(1));
    let log = text_logger("warn");

    group.bench_function("method", |b| {
        b.iter(|| log.debug(black_box("hidden")));
    });

    group.bench_function("macro_with_args", |b| {
        b.iter(|| info!(log, "hidden %s %d", black_box("value"), black_box(42)));
    });

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");
    group.throughput(Throughput::Elements(1));

    let text = text_logger("info");
    group.bench_function("text", |b| {
        b.iter(|| text.info(black_box("Info message")));
    });

    let (raw, _ring) = raw_logger();
    group.bench_function("raw", |b| {
        b.iter(|| raw.info(black_box("Info message")));
    });

    group.bench_function("text_with_fields", |b| {
        b.iter(|| {
            text.info_with(
                fields! { "user_id" => 12345, "action" => "login", "ok" => true },
                black_box("User logged in"),
            )
        });
    });

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for count in [1usize, 4, 16] {
        let specs = (0..count).map(|_| StreamSpec::sink(NullSink)).collect();
        let log = Logger::new(LoggerOptions::new("bench").with_streams(specs)).unwrap();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &log, |b, log| {
            b.iter(|| log.info(black_box("fan out")));
        });
    }

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");

    let args = vec![
        FieldValue::from("user %s logged in from %s after %d attempts"),
        FieldValue::from("ann"),
        FieldValue::from("10.0.0.1"),
        FieldValue::from(3),
    ];
    group.bench_function("format_message", |b| {
        b.iter(|| black_box(format_message(black_box(&args))));
    });

    let line = r#"{"name":"bench","hostname":"box","pid":7,"level":30,"msg":"up","time":"2025-01-08T10:30:45.123Z","v":0,"port":8080}"#;
    for mode in [OutputMode::Long, OutputMode::Short, OutputMode::Simple] {
        let options = RenderOptions::new(mode).with_color(false);
        group.bench_with_input(BenchmarkId::new("render_line", mode), &options, |b, options| {
            b.iter(|| black_box(render_line(black_box(line), options)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_logger_creation,
    bench_disabled_levels,
    bench_emit,
    bench_fan_out,
    bench_formatting,
);
criterion_main!(benches);
