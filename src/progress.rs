use crate::model::{FileRecord, JobReport, JobStats};
use std::path::Path;

/// Emitted synchronously after each file has been handled.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// 1-based position of `record` in the snapshot.
    pub current: usize,
    pub total: usize,
    /// Running tally including `record`.
    pub stats: JobStats,
    pub record: FileRecord,
}

/// Trait for observing a job.
///
/// The CLI implements it with indicatif, the background worker forwards
/// everything over a channel. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self, _root: &Path) {}
    fn on_scan_complete(&self, _total_files: usize) {}
    fn on_file(&self, _event: &ProgressEvent) {}
    fn on_job_complete(&self, _report: &JobReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
