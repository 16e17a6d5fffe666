//! Output sinks
//!
//! A session opens its sink lazily through a [`SinkOpener`] and then hands it
//! one complete record at a time. [`FileOpener`] is the production sink;
//! [`MemorySink`] keeps the log in memory for tests and embedding.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::AuditLogConfig;
use crate::error::AuditError;

/// Destination for encoded records
pub trait LogSink {
    /// Append one complete record
    ///
    /// Returning means the bytes were handed to the underlying medium, not
    /// held in a userspace buffer.
    fn append(&mut self, record: &[u8]) -> io::Result<()>;

    /// Append one record supplied as consecutive parts
    ///
    /// Lets a large snapshot reach the medium straight from the borrowed
    /// region instead of being copied into a single buffer first.
    fn append_parts(&mut self, parts: &[&[u8]]) -> io::Result<()> {
        parts.iter().try_for_each(|part| self.append(part))
    }
}

/// Creates the sink on first use
pub trait SinkOpener {
    type Sink: LogSink;

    /// Open the sink, discarding anything a previous run left there
    fn open(&mut self) -> Result<Self::Sink, AuditError>;

    /// Human-readable description of where records go
    fn target(&self) -> String;
}

/// Opens a log file, truncating it
#[derive(Debug, Clone)]
pub struct FileOpener {
    path: PathBuf,
    sync_on_write: bool,
    create_dirs: bool,
}

impl FileOpener {
    /// Create an opener for `path` with default options
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(&AuditLogConfig::new(path))
    }

    /// Create an opener from a config
    pub fn from_config(config: &AuditLogConfig) -> Self {
        Self {
            path: config.path.clone(),
            sync_on_write: config.sync_on_write,
            create_dirs: config.create_dirs,
        }
    }

    /// The log file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SinkOpener for FileOpener {
    type Sink = FileSink;

    fn open(&mut self) -> Result<FileSink, AuditError> {
        if self.create_dirs {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| AuditError::open(self.target(), e))?;
            }
        }

        let file = File::create(&self.path).map_err(|e| AuditError::open(self.target(), e))?;
        debug!(path = %self.path.display(), sync = self.sync_on_write, "Created audit log file");

        Ok(FileSink {
            file,
            sync_on_write: self.sync_on_write,
        })
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// An open log file
#[derive(Debug)]
pub struct FileSink {
    file: File,
    sync_on_write: bool,
}

impl LogSink for FileSink {
    fn append(&mut self, record: &[u8]) -> io::Result<()> {
        self.append_parts(&[record])
    }

    fn append_parts(&mut self, parts: &[&[u8]]) -> io::Result<()> {
        // File is unbuffered: every part reaches the OS before we return.
        for part in parts {
            self.file.write_all(part)?;
        }
        if self.sync_on_write {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemorySinkInner {
    buf: Mutex<Vec<u8>>,
    opens: AtomicUsize,
    appends: AtomicUsize,
    fail_open: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory sink
///
/// Clones share the same buffer, so a test can keep one handle while the
/// session owns another. Open and write failures can be injected.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<MemorySinkInner>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written since the last open
    pub fn contents(&self) -> Vec<u8> {
        self.inner.buf.lock().clone()
    }

    /// How many times the sink has been opened
    pub fn open_count(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }

    /// How many records have been appended since the last open
    pub fn append_count(&self) -> usize {
        self.inner.appends.load(Ordering::SeqCst)
    }

    /// Make subsequent opens fail
    pub fn set_fail_open(&self, fail: bool) {
        self.inner.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent appends fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl SinkOpener for MemorySink {
    type Sink = MemorySink;

    fn open(&mut self) -> Result<MemorySink, AuditError> {
        if self.inner.fail_open.load(Ordering::SeqCst) {
            return Err(AuditError::open(self.target(), "injected open failure"));
        }
        self.inner.buf.lock().clear();
        self.inner.appends.store(0, Ordering::SeqCst);
        self.inner.opens.fetch_add(1, Ordering::SeqCst);
        Ok(self.clone())
    }

    fn target(&self) -> String {
        "<memory>".to_string()
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, record: &[u8]) -> io::Result<()> {
        self.append_parts(&[record])
    }

    fn append_parts(&mut self, parts: &[&[u8]]) -> io::Result<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("injected write failure"));
        }
        let mut buf = self.inner.buf.lock();
        for part in parts {
            buf.extend_from_slice(part);
        }
        self.inner.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_opener_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        fs::write(&path, b"stale contents").unwrap();

        let mut opener = FileOpener::new(&path);
        let mut sink = opener.open().unwrap();
        sink.append(&[1, 2, 3]).unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_file_opener_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("audit.log");

        let mut opener = FileOpener::new(&path);
        opener.open().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_opener_missing_dir_without_create() {
        let dir = TempDir::new().unwrap();
        let config = AuditLogConfig::new(dir.path().join("missing").join("audit.log"))
            .with_create_dirs(false);

        let mut opener = FileOpener::from_config(&config);
        let err = opener.open().unwrap_err();
        assert!(matches!(err, AuditError::Open { .. }));
    }

    #[test]
    fn test_sync_on_write_sink() {
        let dir = TempDir::new().unwrap();
        let config = AuditLogConfig::new(dir.path().join("audit.log")).with_sync_on_write(true);

        let mut opener = FileOpener::from_config(&config);
        let mut sink = opener.open().unwrap();
        sink.append(b"abc").unwrap();
        sink.append(b"def").unwrap();

        assert_eq!(fs::read(opener.path()).unwrap(), b"abcdef");
    }

    #[test]
    fn test_file_sink_parts() {
        let dir = TempDir::new().unwrap();
        let mut opener = FileOpener::new(dir.path().join("audit.log"));
        let mut sink = opener.open().unwrap();
        let parts: [&[u8]; 3] = [b"head", b"", b"body"];
        sink.append_parts(&parts).unwrap();

        assert_eq!(fs::read(opener.path()).unwrap(), b"headbody");
    }

    #[test]
    fn test_memory_sink_parts_count_as_one_record() {
        let handle = MemorySink::new();
        let mut sink = handle.clone().open().unwrap();
        let parts: [&[u8]; 2] = [&[1, 2], &[3]];
        sink.append_parts(&parts).unwrap();

        assert_eq!(handle.contents(), vec![1, 2, 3]);
        assert_eq!(handle.append_count(), 1);
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let handle = MemorySink::new();
        let mut opener = handle.clone();
        let mut sink = opener.open().unwrap();
        sink.append(&[9, 9]).unwrap();

        assert_eq!(handle.contents(), vec![9, 9]);
        assert_eq!(handle.open_count(), 1);
        assert_eq!(handle.append_count(), 1);
    }

    #[test]
    fn test_memory_sink_injected_failures() {
        let mut opener = MemorySink::new();
        opener.set_fail_open(true);
        assert!(opener.open().is_err());
        assert_eq!(opener.open_count(), 0);

        opener.set_fail_open(false);
        let mut sink = opener.open().unwrap();
        opener.set_fail_writes(true);
        assert!(sink.append(&[1]).is_err());
        assert!(opener.contents().is_empty());
    }
}
