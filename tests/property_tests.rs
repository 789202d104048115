//! Property-based tests for rust_bunyan using proptest

use proptest::prelude::*;
use rust_bunyan::prelude::*;
use rust_bunyan::{format_message, render_line};
use std::sync::Arc;

fn builtin_level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::TRACE),
        Just(Level::DEBUG),
        Just(Level::INFO),
        Just(Level::WARN),
        Just(Level::ERROR),
        Just(Level::FATAL),
    ]
}

fn ring_logger(levels: &[Level]) -> (Logger, Vec<Arc<RingBuffer>>) {
    let rings: Vec<Arc<RingBuffer>> = levels.iter().map(|_| Arc::new(RingBuffer::new(8))).collect();
    let specs = rings
        .iter()
        .zip(levels)
        .map(|(ring, level)| StreamSpec::raw(ring.clone()).with_level(*level))
        .collect();
    let log = Logger::new(LoggerOptions::new("prop").with_streams(specs)).expect("valid options");
    (log, rings)
}

// ============================================================================
// Level Tests
// ============================================================================

proptest! {
    /// Names round-trip through parsing
    #[test]
    fn test_level_name_roundtrip(level in builtin_level()) {
        let name = level.name().expect("built-in levels are named");
        let parsed: Level = name.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Parsing accepts any letter case
    #[test]
    fn test_level_case_insensitive(level in builtin_level(), upper in any::<bool>()) {
        let name = level.name().unwrap();
        let input = if upper { name.to_uppercase() } else { name };
        prop_assert_eq!(input.parse::<Level>().unwrap(), level);
    }

    /// Ordering follows the numeric value
    #[test]
    fn test_level_ordering(a in any::<u32>(), b in any::<u32>()) {
        let (la, lb) = (Level::new(a), Level::new(b));
        prop_assert_eq!(la <= lb, a <= b);
        prop_assert_eq!(la.cmp(&lb), a.cmp(&b));
    }

    /// Raw numbers always resolve, named or not
    #[test]
    fn test_raw_numbers_resolve(n in any::<u32>()) {
        prop_assert_eq!(rust_bunyan::resolve_level(n).unwrap(), Level::new(n));
    }

    /// Levels serialize as their bare integer
    #[test]
    fn test_level_json_roundtrip(n in any::<u32>()) {
        let json = serde_json::to_string(&Level::new(n)).unwrap();
        prop_assert_eq!(&json, &n.to_string());
        let back: Level = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, Level::new(n));
    }

    /// Unknown names never resolve
    #[test]
    fn test_unknown_names_rejected(name in "[a-z]{12,20}") {
        let result = rust_bunyan::resolve_level(name.as_str());
        prop_assert!(
            matches!(result, Err(LoggerError::InvalidLevel { .. })),
            "unexpected level for {:?}", name
        );
    }
}

// ============================================================================
// Effective Level Tests
// ============================================================================

proptest! {
    /// The effective level is the minimum threshold over all destinations,
    /// however the thresholds are changed
    #[test]
    fn test_effective_level_is_minimum(
        initial in prop::collection::vec(builtin_level(), 1..5),
        changes in prop::collection::vec((0usize..5, builtin_level()), 0..10)
    ) {
        let (log, _rings) = ring_logger(&initial);
        prop_assert_eq!(Some(log.level()), initial.iter().copied().min());

        for (index, level) in changes {
            let index = index % initial.len();
            log.set_stream_level(index, level).unwrap();
            prop_assert_eq!(Some(log.level()), log.stream_levels().into_iter().min());
        }
    }

    /// A record reaches exactly the destinations whose threshold it meets
    #[test]
    fn test_fan_out_respects_thresholds(
        thresholds in prop::collection::vec(builtin_level(), 1..5),
        level in builtin_level()
    ) {
        let (log, rings) = ring_logger(&thresholds);
        log.log(level, None, vec!["probe".into()]);
        for (ring, threshold) in rings.iter().zip(&thresholds) {
            prop_assert_eq!(ring.len(), usize::from(*threshold <= level));
        }
        prop_assert_eq!(log.enabled(level), thresholds.iter().any(|t| *t <= level));
    }
}

// ============================================================================
// Record Encoding Tests
// ============================================================================

proptest! {
    /// Any message is written as exactly one JSON line and reads back intact
    #[test]
    fn test_one_line_per_record(message in ".*") {
        let ring = Arc::new(RingBuffer::new(1));
        let log = Logger::new(LoggerOptions::new("enc").add_stream(StreamSpec::raw(ring.clone()))).unwrap();
        log.info(message.as_str());

        let record = ring.get(0).unwrap();
        let line = record.to_json_line().unwrap();
        prop_assert_eq!(line.matches('\n').count(), 1);
        prop_assert!(line.ends_with('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        prop_assert_eq!(parsed["msg"].as_str(), Some(message.as_str()));
    }

    /// A lone template without tokens is the message itself
    #[test]
    fn test_plain_message_unchanged(message in "[^%]*") {
        prop_assert_eq!(format_message(&[FieldValue::from(message.as_str())]), message);
    }

    /// Extra scalar arguments are appended separated by spaces
    #[test]
    fn test_extra_args_appended(head in "[a-z ]*", extra in prop::collection::vec(any::<i64>(), 0..5)) {
        let mut args = vec![FieldValue::from(head.as_str())];
        args.extend(extra.iter().map(|n| FieldValue::from(*n)));

        let mut expected = head.clone();
        for n in &extra {
            expected.push(' ');
            expected.push_str(&n.to_string());
        }
        prop_assert_eq!(format_message(&args), expected);
    }
}

// ============================================================================
// Safety Tests (No Panics)
// ============================================================================

proptest! {
    /// Rendering arbitrary text never panics and non-JSON passes through
    #[test]
    fn test_render_line_passthrough(line in "[^{\\[]*") {
        for mode in [OutputMode::Long, OutputMode::Short, OutputMode::Simple, OutputMode::Json] {
            let options = RenderOptions::new(mode).with_color(false);
            prop_assert_eq!(render_line(&line, &options), line.clone());
        }
    }

    /// Records with arbitrary field values always render
    #[test]
    fn test_render_record_no_panic(
        msg in ".*",
        key in "[a-z]{1,8}",
        value in ".*",
        short in any::<bool>()
    ) {
        let record = serde_json::json!({
            "name": "prop", "hostname": "h", "pid": 1, "level": 30,
            "time": "2025-01-08T10:30:45.123Z", "v": 0,
            "msg": msg, key: value,
        });
        let mode = if short { OutputMode::Short } else { OutputMode::Long };
        let _ = rust_bunyan::render_record(&record, &RenderOptions::new(mode).with_color(false));
    }
}
