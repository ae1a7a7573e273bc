use crate::analyzer::WhiteBackgroundAnalyzer;
use crate::classifier::{FileClassifier, ImageKind};
use crate::config::{JobConfig, NonImageHandling};
use crate::conflict::ConflictResolver;
use crate::date_namer;
use crate::error::Error;
use crate::model::{
    Classification, FileRecord, JobReport, JobState, JobStats, Outcome, RunMode, Verdict,
};
use crate::mover;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::scanner;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives one sorting job: snapshot the source tree, then classify, analyze,
/// rename, resolve and move each file in order.
///
/// Dry runs and commits go through exactly the same steps; only the final
/// move is skipped. Cancellation is checked between files, never inside one.
pub struct JobRunner {
    config: JobConfig,
    cancel_token: Arc<AtomicBool>,
    state: JobState,
}

/// Per-run collaborators built from the config.
struct Pipeline<'a> {
    config: &'a JobConfig,
    mode: RunMode,
    classifier: FileClassifier,
    analyzer: WhiteBackgroundAnalyzer,
    resolver: ConflictResolver,
}

impl JobRunner {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            cancel_token: Arc::new(AtomicBool::new(false)),
            state: JobState::Idle,
        }
    }

    /// Shares an externally owned cancel flag instead of the runner's own.
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel_token = token;
        self
    }

    /// Flag the caller sets to stop the job at the next file boundary.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_token)
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Runs the job to completion or cancellation.
    ///
    /// Only a missing or unreadable source root is returned as `Err`; every
    /// per-file failure is counted in the report's `stats.errors` instead.
    pub fn run(&mut self, mode: RunMode, reporter: &dyn ProgressReporter) -> Result<JobReport, Error> {
        let started = Instant::now();
        info!(
            "Starting {}image processing...",
            if mode.is_dry_run() { "dry-run " } else { "" }
        );
        info!("Import path: {}", self.config.source_root.display());
        info!("Wanted path: {}", self.config.wanted_root.display());
        info!("Unwanted path: {}", self.config.unwanted_root.display());
        info!(
            "Threshold: {}% white ({} RGB min), resized to {}px",
            self.config.white_threshold_percent,
            self.config.white_pixel_min,
            self.config.resize_size
        );

        self.state = JobState::Scanning;
        reporter.on_scan_start(&self.config.source_root);
        let files = match scanner::snapshot(&self.config.source_root, self.config.recursive_scan) {
            Ok(files) => files,
            Err(err) => {
                error!("Scan failed: {}", err);
                self.state = JobState::Failed;
                return Err(err);
            }
        };
        let total = files.len();
        info!("Found {} file(s) to process", total);
        reporter.on_scan_complete(total);

        self.state = JobState::Running;
        let mut pipeline = Pipeline {
            config: &self.config,
            mode,
            classifier: FileClassifier::new(&self.config.supported_extensions),
            analyzer: WhiteBackgroundAnalyzer::from_config(&self.config),
            resolver: ConflictResolver::new(),
        };
        let mut stats = JobStats::default();
        let mut cancelled = false;

        for (index, path) in files.into_iter().enumerate() {
            if self.cancel_token.load(Ordering::SeqCst) {
                warn!("Cancelled after {} of {} file(s)", index, total);
                cancelled = true;
                break;
            }

            let record = pipeline.process(path);
            stats.record(&record);
            log_record(&record, mode);
            reporter.on_file(&ProgressEvent {
                current: index + 1,
                total,
                stats,
                record,
            });
        }

        self.state = if cancelled {
            JobState::Cancelled
        } else {
            JobState::Completed
        };
        let report = JobReport {
            state: self.state,
            mode,
            stats,
            candidates: total,
        };
        info!(
            "Job {:?} in {:.2}s: {} wanted, {} unwanted, {} non-image, {} error(s)",
            report.state,
            started.elapsed().as_secs_f64(),
            stats.wanted,
            stats.unwanted,
            stats.non_image,
            stats.errors
        );
        reporter.on_job_complete(&report);
        Ok(report)
    }
}

impl Pipeline<'_> {
    fn process(&mut self, source: PathBuf) -> FileRecord {
        let mut record = match self.classifier.classify(&source) {
            ImageKind::NonImage => {
                let mut record = FileRecord::new(source, Classification::NonImage);
                record.verdict = Some(Verdict::Wanted);
                record
            }
            ImageKind::Image => match self.analyzer.analyze(&source) {
                Ok(analysis) => {
                    debug!(
                        "White background: {:.1}% - {}",
                        analysis.white_percent, analysis.verdict
                    );
                    let mut record = FileRecord::new(source, Classification::Image);
                    record.white_percent = Some(analysis.white_percent);
                    record.verdict = Some(analysis.verdict);
                    record
                }
                Err(err) => {
                    return FileRecord::new(source, Classification::Unreadable).fail(err);
                }
            },
        };

        let original_name = record.source.file_name().unwrap_or_default().to_os_string();
        let desired_name = if record.classification == Classification::Image
            && record.verdict == Some(Verdict::Wanted)
            && self.config.rename
        {
            self.renamed(&record.source, original_name)
        } else {
            original_name
        };

        let root = self.destination_root(&record);
        let destination = self
            .resolver
            .resolve(root, &desired_name, self.config.conflict_policy);

        match mover::apply(&record.source, &destination, self.mode) {
            Ok(outcome) => {
                self.resolver.claim(destination.clone());
                record.destination = Some(destination);
                record.outcome = outcome;
                record
            }
            Err(err) => record.fail(err),
        }
    }

    fn renamed(&self, source: &Path, original_name: OsString) -> OsString {
        match date_namer::derive_prefix(source) {
            Some(prefix) => {
                debug!("EXIF date found: {}", prefix);
                date_namer::prefixed_name(&prefix, &original_name)
            }
            None => {
                debug!(
                    "No EXIF DateTimeOriginal in {}, keeping name",
                    original_name.to_string_lossy()
                );
                original_name
            }
        }
    }

    fn destination_root(&self, record: &FileRecord) -> &Path {
        if record.classification == Classification::NonImage {
            return match self.config.non_image_handling {
                NonImageHandling::MoveToWanted => &self.config.wanted_root,
            };
        }
        match record.verdict {
            Some(Verdict::Unwanted) => &self.config.unwanted_root,
            _ => &self.config.wanted_root,
        }
    }
}

fn log_record(record: &FileRecord, mode: RunMode) {
    let name = record.file_name();
    match (&record.outcome, &record.destination, &record.error) {
        (Outcome::Error, _, Some(err)) => warn!("✗ {}: {}", name, err),
        (outcome, Some(destination), _) => {
            let verb = if *outcome == Outcome::WouldMove {
                "Would move"
            } else {
                "Moved"
            };
            let bucket = match (record.classification, record.verdict) {
                (Classification::NonImage, _) => "Wanted (non-image)".to_string(),
                (_, Some(verdict)) => verdict.to_string(),
                _ => String::from("?"),
            };
            debug!("✓ {} {} to {} as {}", verb, name, bucket, destination.display());
        }
        _ => debug!("{} processed in {:?} mode with no destination", name, mode),
    }
}
