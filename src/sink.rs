//! Failure sink: durable record of post-level failures for offline triage.
//!
//! The sink is an explicit dependency of the orchestrator, not process-wide
//! logger state, so tests can substitute an in-memory implementation.
//! Recording must never raise; losing a diagnostic line must not abort the
//! batch, so sink write errors go to stderr and are otherwise swallowed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// One post-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub post_id: u64,
    pub tags: Vec<String>,
    /// Name of the cache/json file being processed when the post failed.
    pub source_file: String,
    pub cause: String,
}

pub trait FailureSink {
    fn record(&self, record: &FailureRecord);
}

/// Append-only text log. Two lines per record at a fatal severity marker:
/// the post line (`id`, tags, source file), then the cause.
pub struct FileFailureSink {
    path: PathBuf,
}

impl FileFailureSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn append(&self, record: &FailureRecord) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "FATAL {} {:?} file {}",
            record.post_id, record.tags, record.source_file
        )?;
        writeln!(file, "FATAL {}", record.cause)?;
        Ok(())
    }
}

impl FailureSink for FileFailureSink {
    fn record(&self, record: &FailureRecord) {
        if let Err(e) = self.append(record) {
            eprintln!(
                "failed to record failure for post {} in {}: {}",
                record.post_id,
                self.path.display(),
                e
            );
        }
    }
}

/// In-memory sink for tests and dry inspection.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<FailureRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().expect("sink lock poisoned").clone()
    }
}

impl FailureSink for MemorySink {
    fn record(&self, record: &FailureRecord) {
        self.records
            .lock()
            .expect("sink lock poisoned")
            .push(record.clone());
    }
}
