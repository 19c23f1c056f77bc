//! Result sink for discovered domains.
//!
//! A sink receives one domain per discovery and must persist it as a complete
//! `domain\n` line. Appends are serialized behind a mutex so that probes
//! finishing at the same time can never interleave partial lines.

use crate::error::SweepError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Append-only destination for available domains.
pub trait ResultSink: Send + Sync {
    /// Persist one domain as a single line.
    fn append(&self, domain: &str) -> Result<(), SweepError>;

    /// Flush anything still buffered.
    fn flush(&self) -> Result<(), SweepError>;
}

/// Line-oriented sink over any writer.
///
/// Each line is written and flushed while holding the lock.
#[derive(Debug)]
pub struct LineSink<W: Write> {
    label: String,
    writer: Mutex<W>,
}

impl<W: Write> LineSink<W> {
    /// Wrap a writer; `label` names it in error messages.
    pub fn new<L: Into<String>>(label: L, writer: W) -> Self {
        Self {
            label: label.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LineSink<BufWriter<File>> {
    /// Create (or truncate) the output file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SweepError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            SweepError::file_error(
                path.to_string_lossy(),
                format!("Failed to create output file: {}", e),
            )
        })?;
        Ok(Self::new(path.to_string_lossy(), BufWriter::new(file)))
    }
}

impl LineSink<Vec<u8>> {
    /// In-memory sink, mostly useful for tests and dry runs.
    pub fn in_memory() -> Self {
        Self::new("<memory>", Vec::new())
    }

    /// Lines written so far.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl<W: Write + Send> ResultSink for LineSink<W> {
    fn append(&self, domain: &str) -> Result<(), SweepError> {
        let mut line = String::with_capacity(domain.len() + 1);
        line.push_str(domain);
        line.push('\n');

        let mut writer = self.lock();
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| SweepError::sink_write(&self.label, e.to_string()))
    }

    fn flush(&self) -> Result<(), SweepError> {
        self.lock()
            .flush()
            .map_err(|e| SweepError::sink_write(&self.label, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_in_memory_lines() {
        let sink = LineSink::in_memory();
        sink.append("a.com").unwrap();
        sink.append("b.com").unwrap();
        assert_eq!(sink.lines(), vec!["a.com", "b.com"]);
        assert_eq!(sink.into_inner(), b"a.com\nb.com\n".to_vec());
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("available_domains.txt");
        std::fs::write(&path, "stale.com\n").unwrap();

        let sink = LineSink::create(&path).unwrap();
        sink.append("fresh.com").unwrap();
        sink.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "fresh.com\n");
    }

    #[test]
    fn test_each_append_is_visible_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let sink = LineSink::create(&path).unwrap();

        sink.append("first.com").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first.com\n");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let err = LineSink::create(&path).unwrap_err();
        assert!(matches!(err, SweepError::FileError { .. }));
    }

    #[test]
    fn test_concurrent_appends_never_interleave() {
        let sink = Arc::new(LineSink::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        sink.append(&format!("thread{}-domain{}.com", t, i)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), 1_600);
        for line in lines {
            assert!(line.starts_with("thread"));
            assert!(line.ends_with(".com"));
            assert_eq!(line.matches(".com").count(), 1);
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_maps_to_sink_error() {
        let sink = LineSink::new("broken.txt", FailingWriter);
        let err = sink.append("a.com").unwrap_err();
        assert!(matches!(err, SweepError::SinkWrite { .. }));
        assert!(err.to_string().contains("broken.txt"));
        assert!(err.to_string().contains("disk full"));
    }
}
