//! File sink implementation
//!
//! Opens its path in append mode (creating it if missing) on the first
//! write, so a bad path does not fail logger construction. The open error
//! is returned from that first write and reported by the logger; every
//! later write fails with `SinkUnavailable`.

use crate::core::{LoggerError, Result, Sink, WriteUnit};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

enum FileState {
    Pending,
    Open(BufWriter<File>),
    Failed,
    Closed,
}

pub struct FileSink {
    path: PathBuf,
    label: String,
    state: Mutex<FileState>,
}

impl FileSink {
    /// Sink for `path`, opened lazily on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            label: path.display().to_string(),
            path,
            state: Mutex::new(FileState::Pending),
        }
    }

    /// Sink for `path`, opened immediately
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_bunyan::appenders::FileSink;
    ///
    /// let sink = FileSink::open("/var/log/app.log").unwrap();
    /// ```
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let sink = Self::new(path);
        let file = sink.open_file()?;
        *sink.state.lock() = FileState::Open(BufWriter::new(file));
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LoggerError::io_operation("opening log file", self.label.clone(), e))
    }
}

impl Sink for FileSink {
    fn write(&self, unit: &WriteUnit) -> Result<()> {
        let line = unit.to_text()?;
        let mut state = self.state.lock();
        if matches!(*state, FileState::Pending) {
            match self.open_file() {
                Ok(file) => *state = FileState::Open(BufWriter::new(file)),
                Err(e) => {
                    *state = FileState::Failed;
                    return Err(e);
                }
            }
        }
        match &mut *state {
            FileState::Open(writer) => {
                writer.write_all(line.as_bytes())?;
                writer.flush()?;
                Ok(())
            }
            FileState::Failed => Err(LoggerError::sink_unavailable(self.label.clone())),
            FileState::Closed => Err(LoggerError::sink_closed(self.label.clone())),
            FileState::Pending => Err(LoggerError::writer("file writer not initialized")),
        }
    }

    fn flush(&self) -> Result<()> {
        if let FileState::Open(writer) = &mut *self.state.lock() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        let result = match &mut *state {
            FileState::Open(writer) => writer.flush().map_err(LoggerError::from),
            _ => Ok(()),
        };
        *state = FileState::Closed;
        result
    }

    fn name(&self) -> &str {
        &self.label
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
