mod common;

use common::*;
use photo_sorter::worker::{self, JobEvent};
use photo_sorter::{Error, JobState, RunMode};
use std::fs;

#[test]
fn test_worker_streams_events_then_report() {
    let ws = Workspace::new();
    write_png(&ws.import("keep.png"), 0);
    write_png(&ws.import("drop.png"), 20);
    fs::write(ws.import("notes.txt"), "n").unwrap();

    let handle = worker::spawn(ws.config.clone(), RunMode::Commit).unwrap();
    let events: Vec<JobEvent> = handle.events().iter().collect();
    let report = handle.join().unwrap();

    assert!(matches!(events.first(), Some(JobEvent::ScanStarted(_))));
    assert!(matches!(
        events.get(1),
        Some(JobEvent::ScanComplete { total_files: 3 })
    ));
    let files = events
        .iter()
        .filter(|e| matches!(e, JobEvent::File(_)))
        .count();
    assert_eq!(files, 3);
    match events.last() {
        Some(JobEvent::Finished(finished)) => assert_eq!(*finished, report),
        other => panic!("expected Finished, got {:?}", other),
    }

    assert_eq!(report.state, JobState::Completed);
    assert_eq!(report.stats.wanted, 1);
    assert_eq!(report.stats.unwanted, 1);
    assert_eq!(report.stats.non_image, 1);
    assert_eq!(file_names(&ws.config.unwanted_root), vec!["drop.png"]);
}

#[test]
fn test_worker_reports_systemic_failure() {
    let mut ws = Workspace::new();
    ws.config.source_root = ws.tmp.path().join("missing");

    let handle = worker::spawn(ws.config.clone(), RunMode::DryRun).unwrap();
    let events: Vec<JobEvent> = handle.events().iter().collect();

    assert!(matches!(events.last(), Some(JobEvent::Failed(_))));
    assert!(!events.iter().any(|e| matches!(e, JobEvent::File(_))));
    assert!(matches!(handle.join(), Err(Error::SourceMissing(_))));
}

#[test]
fn test_worker_cancel_before_first_file() {
    let ws = Workspace::new();
    for i in 0..5 {
        fs::write(ws.import(&format!("f{}.txt", i)), "x").unwrap();
    }

    let handle = worker::spawn(ws.config.clone(), RunMode::Commit).unwrap();
    handle.cancel();
    let report = handle.join().unwrap();

    // The flag may land after some files; whatever ran is fully moved.
    let moved = file_names(&ws.config.wanted_root).len();
    let left = file_names(&ws.config.source_root).len();
    assert_eq!(moved, report.stats.total);
    assert_eq!(moved + left, 5);
    if report.stats.total < 5 {
        assert_eq!(report.state, JobState::Cancelled);
    }
}

#[test]
fn test_commit_flattens_import_first() {
    let mut ws = Workspace::new();
    ws.config.flatten_import_folder = true;
    ws.config.recursive_scan = false;
    fs::write(ws.import("deep/er/a.txt"), "a").unwrap();
    fs::write(ws.import("b.txt"), "b").unwrap();

    let handle = worker::spawn(ws.config.clone(), RunMode::Commit).unwrap();
    let report = handle.join().unwrap();

    assert_eq!(report.stats.non_image, 2);
    assert_eq!(file_names(&ws.config.wanted_root), vec!["a.txt", "b.txt"]);
    assert!(file_names(&ws.config.source_root).is_empty());
}

#[test]
fn test_dry_run_with_flatten_leaves_tree_alone() {
    let mut ws = Workspace::new();
    ws.config.flatten_import_folder = true;
    ws.config.recursive_scan = false;
    fs::write(ws.import("deep/a.txt"), "a").unwrap();

    let report = worker::spawn(ws.config.clone(), RunMode::DryRun)
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(report.stats.non_image, 1);
    assert!(ws.import("deep/a.txt").exists());
    assert!(!ws.config.wanted_root.exists());
}
