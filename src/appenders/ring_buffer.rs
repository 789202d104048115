//! In-memory ring buffer of recent records
//!
//! A raw destination that keeps the last `limit` records, useful for
//! attaching recent context to an error report or for assertions in tests.

use crate::core::{Fields, LogRecord, LoggerError, Result, Sink, WriteUnit};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_RING_BUFFER_LIMIT: usize = 100;

pub struct RingBuffer {
    limit: usize,
    records: Mutex<VecDeque<Arc<LogRecord>>>,
    ended: AtomicBool,
}

impl RingBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            records: Mutex::new(VecDeque::with_capacity(limit.min(1024))),
            ended: AtomicBool::new(false),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// All held records, oldest first
    pub fn records(&self) -> Vec<Arc<LogRecord>> {
        self.records.lock().iter().cloned().collect()
    }

    /// The `index`-th most recent record; `get(0)` is the newest
    pub fn get(&self, index: usize) -> Option<Arc<LogRecord>> {
        let records = self.records.lock();
        let len = records.len();
        if index >= len {
            return None;
        }
        records.get(len - 1 - index).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Stop accepting writes; held records remain readable
    pub fn end(&self) {
        self.ended.store(true, Ordering::Release);
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_RING_BUFFER_LIMIT)
    }
}

impl Sink for RingBuffer {
    fn write(&self, unit: &WriteUnit) -> Result<()> {
        if self.is_ended() {
            return Err(LoggerError::sink_closed("ringbuffer"));
        }
        let record = match unit {
            WriteUnit::Raw(record) => Arc::clone(record),
            WriteUnit::Text(line) => {
                let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(line)?;
                Arc::new(LogRecord::from_fields(Fields::from(map)))
            }
        };
        let mut records = self.records.lock();
        records.push_back(record);
        while records.len() > self.limit {
            records.pop_front();
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.end();
        Ok(())
    }

    fn name(&self) -> &str {
        "ringbuffer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(msg: &str) -> WriteUnit {
        WriteUnit::Raw(Arc::new(LogRecord::from_fields(
            Fields::new().with_field("msg", msg),
        )))
    }

    #[test]
    fn test_keeps_last_n_newest_first() {
        let ring = RingBuffer::new(2);
        for msg in ["a", "b", "c"] {
            ring.write(&raw(msg)).unwrap();
        }
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.get(0).unwrap().msg(), "c");
        assert_eq!(ring.get(1).unwrap().msg(), "b");
        assert!(ring.get(2).is_none());
        let oldest_first: Vec<String> = ring.records().iter().map(|r| r.msg().to_string()).collect();
        assert_eq!(oldest_first, vec!["b", "c"]);
    }

    #[test]
    fn test_same_record_instance_is_kept() {
        let ring = RingBuffer::default();
        let unit = raw("shared");
        ring.write(&unit).unwrap();
        let WriteUnit::Raw(original) = &unit else {
            unreachable!()
        };
        assert!(Arc::ptr_eq(original, &ring.get(0).unwrap()));
        assert_eq!(ring.limit(), DEFAULT_RING_BUFFER_LIMIT);
    }

    #[test]
    fn test_text_lines_are_parsed() {
        let ring = RingBuffer::new(5);
        ring.write(&WriteUnit::Text(Arc::from("{\"msg\":\"from text\",\"level\":30}\n")))
            .unwrap();
        assert_eq!(ring.get(0).unwrap().msg(), "from text");
    }

    #[test]
    fn test_end_rejects_writes() {
        let ring = RingBuffer::new(5);
        ring.write(&raw("before")).unwrap();
        ring.end();
        let err = ring.write(&raw("after")).unwrap_err();
        assert_eq!(err.to_string(), "sink 'ringbuffer' has been ended already");
        assert_eq!(ring.len(), 1);
    }
}
