use indicatif::{ProgressBar, ProgressStyle};
use photo_sorter::progress::{ProgressEvent, ProgressReporter};
use photo_sorter::{JobEvent, JobReport};
use std::path::Path;
use std::sync::Mutex;

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (file count unknown until the snapshot is taken)
/// - Sort phase: progress bar over the snapshot
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    /// Feeds one event received from the background worker.
    pub fn handle(&self, event: &JobEvent) {
        match event {
            JobEvent::ScanStarted(root) => self.on_scan_start(root),
            JobEvent::ScanComplete { total_files } => self.on_scan_complete(*total_files),
            JobEvent::File(progress) => self.on_file(progress),
            JobEvent::Finished(report) => self.on_job_complete(report),
            JobEvent::Failed(_) => self.finish_bar(),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "  {spinner:.cyan} Sorting [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━╸─")
    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, root: &Path) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(format!("Scanning {}...", root.display()));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_scan_complete(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        pb.set_style(bar_style());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file(&self, event: &ProgressEvent) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position(event.current as u64);
                pb.set_message(event.record.file_name());
            }
        }
    }

    fn on_job_complete(&self, _report: &JobReport) {
        self.finish_bar();
    }
}
