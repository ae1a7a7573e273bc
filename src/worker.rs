//! Background execution of a single job.
//!
//! The worker thread owns the [`JobRunner`] and its statistics. The caller
//! only receives [`JobEvent`]s over a channel and may set the shared cancel
//! flag; nothing else is shared between the two sides.

use crate::config::JobConfig;
use crate::engine::JobRunner;
use crate::error::Error;
use crate::flatten;
use crate::model::{JobReport, RunMode};
use crate::progress::{ProgressEvent, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub enum JobEvent {
    ScanStarted(PathBuf),
    ScanComplete { total_files: usize },
    File(ProgressEvent),
    Finished(JobReport),
    /// Systemic failure; no files were touched.
    Failed(String),
}

/// Forwards reporter callbacks over a channel. A closed receiver is ignored so
/// a caller that stops listening cannot break the job.
pub struct ChannelReporter {
    tx: Sender<JobEvent>,
}

impl ChannelReporter {
    pub fn new(tx: Sender<JobEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: JobEvent) {
        let _ = self.tx.send(event);
    }
}

impl ProgressReporter for ChannelReporter {
    fn on_scan_start(&self, root: &Path) {
        self.send(JobEvent::ScanStarted(root.to_path_buf()));
    }

    fn on_scan_complete(&self, total_files: usize) {
        self.send(JobEvent::ScanComplete { total_files });
    }

    fn on_file(&self, event: &ProgressEvent) {
        self.send(JobEvent::File(event.clone()));
    }

    fn on_job_complete(&self, report: &JobReport) {
        self.send(JobEvent::Finished(*report));
    }
}

pub struct JobHandle {
    events: Receiver<JobEvent>,
    cancel_token: Arc<AtomicBool>,
    thread: JoinHandle<Result<JobReport, Error>>,
}

impl JobHandle {
    pub fn events(&self) -> &Receiver<JobEvent> {
        &self.events
    }

    /// Asks the worker to stop before its next file.
    pub fn cancel(&self) {
        self.cancel_token.store(true, Ordering::SeqCst);
    }

    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_token)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn join(self) -> Result<JobReport, Error> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)?
    }
}

/// Starts `config` on a dedicated worker thread.
///
/// When `flatten_import_folder` is set, a commit flattens the import folder
/// before scanning. A dry run must not touch the tree, so it scans
/// recursively instead, which visits the same files the flattened tree
/// would hold. Nested files whose names clash get their `_n` suffix from
/// flatten on a commit but from the destination folder on a dry run, so
/// their predicted names can differ (`20210309_a_1.jpg` against
/// `20210309_a.jpg` plus a suffix); the counts and routing do not.
pub fn spawn(config: JobConfig, mode: RunMode) -> Result<JobHandle, Error> {
    let (tx, rx) = mpsc::channel();
    let cancel_token = Arc::new(AtomicBool::new(false));
    let worker_token = Arc::clone(&cancel_token);

    let thread = thread::Builder::new()
        .name("photo-sorter-worker".into())
        .spawn(move || run_job(config, mode, worker_token, tx))?;

    Ok(JobHandle {
        events: rx,
        cancel_token,
        thread,
    })
}

fn run_job(
    mut config: JobConfig,
    mode: RunMode,
    cancel_token: Arc<AtomicBool>,
    tx: Sender<JobEvent>,
) -> Result<JobReport, Error> {
    if config.flatten_import_folder {
        if mode.is_dry_run() {
            warn!("Dry-run: import folder is not flattened, scanning recursively instead");
            config.recursive_scan = true;
        } else {
            info!("Flattening import folder: {}", config.source_root.display());
            match flatten::flatten_folder(&config.source_root) {
                Ok(stats) => info!(
                    "Import folder flattened: {} file(s) moved, {} folder(s) removed",
                    stats.moved, stats.dirs_removed
                ),
                Err(err) => error!("Error flattening folder: {}", err),
            }
        }
    }

    let reporter = ChannelReporter::new(tx.clone());
    let mut runner = JobRunner::new(config).with_cancel_token(cancel_token);
    let result = runner.run(mode, &reporter);
    if let Err(err) = &result {
        let _ = tx.send(JobEvent::Failed(err.to_string()));
    }
    result
}
