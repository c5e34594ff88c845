//! Tracing writers for independent terminal and file log layers.
//!
//! stdout carries the wire protocol, so nothing but encoded batches may
//! reach it. The terminal layer writes to stderr; the optional file layer
//! appends to `<log_dir>/scenebridge.log` through [`LockedMakeWriter`].

use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "scenebridge.log";

/// [`MakeWriter`](tracing_subscriber::fmt::MakeWriter) over a shared sink.
///
/// Each event is buffered and written under the lock in one call, so lines
/// from different threads never interleave. Use with `.with_ansi(false)`.
pub struct LockedMakeWriter<W> {
    sink: Arc<Mutex<W>>,
}

impl<W> Clone for LockedMakeWriter<W> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<W: Write> LockedMakeWriter<W> {
    pub fn new(sink: Arc<Mutex<W>>) -> Self {
        Self { sink }
    }
}

impl<'a, W: Write + 'a> tracing_subscriber::fmt::MakeWriter<'a> for LockedMakeWriter<W> {
    type Writer = EventWriter<'a, W>;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter {
            sink: &self.sink,
            buf: Vec::with_capacity(256),
        }
    }
}

/// Buffers one formatted event; flushes it to the sink on [`Drop`].
pub struct EventWriter<'a, W: Write> {
    sink: &'a Mutex<W>,
    buf: Vec<u8>,
}

impl<W: Write> Write for EventWriter<'_, W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> Drop for EventWriter<'_, W> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let mut sink = self.sink.lock();
        let _ = sink.write_all(&self.buf);
        let _ = sink.flush();
    }
}

/// Opens `<log_dir>/scenebridge.log` for appending.
///
/// Returns `None` (after a warning on stderr) when the directory or file
/// cannot be created. File logging is never fatal.
pub fn open_log_file(log_dir: &Path) -> Option<Arc<Mutex<File>>> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!(
            "Warning: cannot create log directory {}: {e}",
            log_dir.display()
        );
        return None;
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Some(Arc::new(Mutex::new(file))),
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", log_path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn event_reaches_sink_only_on_drop() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let make = LockedMakeWriter::new(Arc::clone(&sink));
        {
            let mut writer = make.make_writer();
            writer.write_all(b"first half ").expect("buffered");
            writer.write_all(b"second half\n").expect("buffered");
            assert!(sink.lock().is_empty());
        }
        assert_eq!(sink.lock().as_slice(), b"first half second half\n");
    }

    #[test]
    fn empty_events_write_nothing() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let make = LockedMakeWriter::new(Arc::clone(&sink));
        drop(make.make_writer());
        assert!(sink.lock().is_empty());
    }

    #[test]
    fn open_log_file_creates_directory() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let dir = tmp.path().join("nested").join("logs");
        let file = open_log_file(&dir);
        assert!(file.is_some());
        assert!(dir.join(LOG_FILE_NAME).exists());
    }
}
