// framescan-core/tests/pool_tests.rs
//
// Scheduling behaviour of the analysis worker pool.

mod common;

use common::{ScriptedCapability, write_frames};
use framescan_core::capability::{CapabilityError, Classification};
use framescan_core::config::RetryPolicy;
use framescan_core::pool::{AnalysisStatus, analyze};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn contents(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("OK frame {i}")).collect()
}

#[test]
fn test_one_result_per_frame_at_any_concurrency() {
    const FRAMES: usize = 8;
    for concurrency in [1, 4, FRAMES, FRAMES + 10] {
        let dir = tempdir().unwrap();
        let owned = contents(FRAMES);
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
        let frames = write_frames(dir.path(), &refs);
        let capability = Arc::new(ScriptedCapability::echo());

        let results: Vec<_> = analyze(
            frames,
            "inspect",
            concurrency,
            Arc::clone(&capability),
            RetryPolicy::NONE,
        )
        .unwrap()
        .collect();

        assert_eq!(results.len(), FRAMES, "concurrency {concurrency}");
        let ordinals: HashSet<u32> = results.iter().map(|r| r.frame.ordinal).collect();
        assert_eq!(ordinals.len(), FRAMES, "concurrency {concurrency}");
        assert_eq!(capability.calls(), FRAMES, "concurrency {concurrency}");
        assert!(capability.instructions().iter().all(|i| i == "inspect"));
    }
}

#[test]
fn test_in_flight_calls_never_exceed_concurrency() {
    let dir = tempdir().unwrap();
    let owned = contents(12);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    let frames = write_frames(dir.path(), &refs);
    let capability = Arc::new(ScriptedCapability::echo().with_delay(Duration::from_millis(20)));

    let count = analyze(frames, "inspect", 3, Arc::clone(&capability), RetryPolicy::NONE)
        .unwrap()
        .count();

    assert_eq!(count, 12);
    assert!(capability.max_in_flight() <= 3);
    assert!(capability.max_in_flight() >= 1);
}

#[test]
fn test_single_worker_runs_calls_one_at_a_time() {
    let dir = tempdir().unwrap();
    let frames = write_frames(dir.path(), &["OK a", "OK b", "OK c", "OK d"]);
    let capability = Arc::new(ScriptedCapability::echo().with_delay(Duration::from_millis(5)));

    let count = analyze(frames, "inspect", 1, Arc::clone(&capability), RetryPolicy::NONE)
        .unwrap()
        .count();

    assert_eq!(count, 4);
    assert_eq!(capability.max_in_flight(), 1);
}

#[test]
fn test_failing_task_does_not_affect_siblings() {
    let dir = tempdir().unwrap();
    let frames = write_frames(
        dir.path(),
        &["OK", "Found: glitch", "explode", "OK", "**Found** artifact"],
    );
    let capability = Arc::new(ScriptedCapability::new(|content| {
        if content == b"explode" {
            Err(CapabilityError::Other("model crashed".to_string()))
        } else {
            Ok(Classification::new(String::from_utf8_lossy(content)))
        }
    }));

    let results: Vec<_> = analyze(frames, "inspect", 2, capability, RetryPolicy::NONE)
        .unwrap()
        .collect();

    assert_eq!(results.len(), 5);
    for result in &results {
        let expected = std::fs::read_to_string(&result.frame.path).unwrap();
        match &result.status {
            AnalysisStatus::Failed(reason) => {
                assert_eq!(result.frame.ordinal, 3);
                assert!(reason.contains("model crashed"));
            }
            AnalysisStatus::Completed(classification) => {
                assert_eq!(classification.text, expected);
            }
        }
    }
}

#[test]
fn test_abandoned_stream_stops_new_submissions() {
    const FRAMES: usize = 20;
    let dir = tempdir().unwrap();
    let owned = contents(FRAMES);
    let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
    let frames = write_frames(dir.path(), &refs);
    let capability = Arc::new(ScriptedCapability::echo().with_delay(Duration::from_millis(50)));

    let mut stream = analyze(frames, "inspect", 2, Arc::clone(&capability), RetryPolicy::NONE).unwrap();
    assert!(stream.next().is_some());
    drop(stream);

    // Dropping waits for in-flight calls, so nothing is still running.
    let calls_at_drop = capability.calls();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(capability.calls(), calls_at_drop);
    assert!(calls_at_drop < FRAMES);
    assert!(calls_at_drop <= 5, "{calls_at_drop} calls after abandoning");
}

#[test]
fn test_retries_only_transient_failures() {
    let dir = tempdir().unwrap();
    let frames = write_frames(dir.path(), &["flaky", "permanent", "OK"]);
    let attempts: Mutex<HashMap<Vec<u8>, usize>> = Mutex::new(HashMap::new());
    let capability = Arc::new(ScriptedCapability::new(move |content| {
        let mut attempts = attempts.lock().unwrap();
        let attempt = attempts.entry(content.to_vec()).or_insert(0);
        *attempt += 1;
        match content {
            b"flaky" if *attempt == 1 => Err(CapabilityError::Transport("connection reset".to_string())),
            b"permanent" => Err(CapabilityError::Status {
                status: 400,
                body: "invalid image".to_string(),
            }),
            _ => Ok(Classification::new("OK")),
        }
    }));

    let results: Vec<_> = analyze(
        frames,
        "inspect",
        1,
        Arc::clone(&capability),
        RetryPolicy::with_retries(2),
    )
    .unwrap()
    .collect();

    assert_eq!(results.len(), 3);
    assert_eq!(capability.calls(), 4);
    let permanent = results.iter().find(|r| r.frame.ordinal == 2).unwrap();
    assert!(matches!(permanent.status, AnalysisStatus::Failed(_)));
    let flaky = results.iter().find(|r| r.frame.ordinal == 1).unwrap();
    assert_eq!(flaky.classification(), Some("OK"));
}

#[test]
fn test_without_retries_transient_failure_is_final() {
    let dir = tempdir().unwrap();
    let frames = write_frames(dir.path(), &["a", "b"]);
    let capability = Arc::new(ScriptedCapability::new(|_| {
        Err(CapabilityError::Status {
            status: 503,
            body: "model loading".to_string(),
        })
    }));

    let results: Vec<_> = analyze(frames, "inspect", 2, Arc::clone(&capability), RetryPolicy::NONE)
        .unwrap()
        .collect();

    assert_eq!(capability.calls(), 2);
    assert!(results.iter().all(|r| matches!(r.status, AnalysisStatus::Failed(_))));
}
