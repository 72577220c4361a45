//! ## lockbete-core::sink
//! **Append-only evidence sinks**
//!
//! The engine writes one record per datagram through [`EventSink`] and never
//! reads anything back. Sinks own their files and writers; the engine owns
//! neither.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SinkError;
use crate::record::SnmpRequestRecord;

/// Destination for evidence records. Implementations must be safe to share
/// across tasks; a failed append is reported, never retried.
///
/// `append` is synchronous and is called from the receive loop, so the next
/// datagram is not read until it returns. A sink that can block for long
/// (slow disk, full pipe) stalls reception for that long; replies already in
/// flight are unaffected.
pub trait EventSink: Send + Sync {
    fn append(&self, record: &SnmpRequestRecord) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn append(&self, record: &SnmpRequestRecord) -> Result<(), SinkError> {
        (**self).append(record)
    }
}

/// Appends JSON lines to a file.
///
/// The file is reopened in append mode for every record, so external log
/// rotation (rename + new file) is picked up without a restart. Open, write
/// and flush are blocking `std::fs` calls made on the calling task.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesSink {
    /// Creates a sink for `path`, creating the parent directory first when
    /// `create_dirs` is set.
    pub fn open(path: impl Into<PathBuf>, create_dirs: bool) -> Result<Self, SinkError> {
        let path = path.into();
        if create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonLinesSink {
    fn append(&self, record: &SnmpRequestRecord) -> Result<(), SinkError> {
        let mut line = record.to_json_line()?;
        line.push('\n');

        let io_err = |source: std::io::Error| SinkError::Io {
            path: self.path.clone(),
            source,
        };

        // Serialize writers so concurrent records never interleave.
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)
    }
}

/// Writes JSON lines to any writer (stdout, a socket, a buffer).
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> EventSink for WriterSink<W> {
    fn append(&self, record: &SnmpRequestRecord) -> Result<(), SinkError> {
        let line = record.to_json_line()?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SnmpRequestRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SnmpRequestRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn append(&self, record: &SnmpRequestRecord) -> Result<(), SinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RequestEvent;
    use bytes::Bytes;
    use lockbete_protocols::classify;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn record(payload: &'static [u8]) -> SnmpRequestRecord {
        let event = RequestEvent::received("192.0.2.10:5000".parse().unwrap(), Bytes::from_static(payload));
        SnmpRequestRecord::new(&event, &classify(payload))
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("lockbete-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn test_json_lines_sink_appends() {
        let dir = scratch_dir("sink");
        let path = dir.join("snmp").join("snmp-honeypot.json");
        let sink = JsonLinesSink::open(&path, true).unwrap();

        sink.append(&record(b"0public")).unwrap();
        sink.append(&record(b"\xa0")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(contents.ends_with('\n'));

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["community_string"], "public");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["snmp_operation"], "GetRequest");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_json_lines_sink_reports_missing_directory() {
        let path = scratch_dir("missing").join("nested").join("out.json");
        let sink = JsonLinesSink::open(&path, false).unwrap();
        let err = sink.append(&record(b"x")).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
        assert!(err.to_string().contains("out.json"));
    }

    #[test]
    fn test_writer_sink() {
        let sink = WriterSink::new(Vec::new());
        sink.append(&record(b"0")).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("\"snmp_detected\":true"));
    }

    #[test]
    fn test_memory_sink_through_arc() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn EventSink> = sink.clone();
        shared.append(&record(b"")).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].data_length, 0);
    }
}
