//! Worker-pool forms of write, load and query.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use fzindex::{Cancellable, Completion, FuzzyIndex, QueryOptions};

use super::common::{builder_with, keys_of, temp_dir, COMMANDS};

fn loaded(dir: &std::path::Path) -> Arc<FuzzyIndex> {
    let path = dir.join("bg.fzi");
    let mut builder = builder_with(false, COMMANDS);
    let written = builder.write_async(&path, Cancellable::new()).wait().unwrap();
    assert!(!written.is_cancelled());

    match FuzzyIndex::load_async(path).wait().unwrap() {
        Completion::Done(index) => Arc::new(index),
        Completion::Cancelled => panic!("load cannot be cancelled"),
    }
}

#[test]
fn test_async_write_then_async_load() {
    let dir = temp_dir();
    let index = loaded(dir.path());
    assert_eq!(index.key_count(), COMMANDS.len());
}

#[test]
fn test_async_load_of_missing_file_reports_error() {
    let dir = temp_dir();
    let outcome = FuzzyIndex::load_async(dir.path().join("missing.fzi")).wait();
    assert!(outcome.is_err());
}

#[test]
fn test_query_async_matches_blocking_query() {
    let dir = temp_dir();
    let index = loaded(dir.path());

    let pending = index.query_async("fo", QueryOptions::new(), Cancellable::new());
    let background = pending.wait().unwrap().done().unwrap();
    let blocking = index
        .query("fo", QueryOptions::new(), &Cancellable::new())
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(keys_of(&background), keys_of(&blocking));
    assert!(!background.is_empty());
}

#[test]
fn test_query_with_delivers_to_callback() {
    let dir = temp_dir();
    let index = loaded(dir.path());

    let (tx, rx) = mpsc::channel();
    index.query_with(
        "cw",
        QueryOptions::new(),
        Cancellable::new(),
        move |outcome| {
            let keys = outcome.ok().and_then(Completion::done).map(|m| keys_of(&m));
            let _ = tx.send(keys);
        },
    );
    let keys = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(keys, Some(vec!["close_window".to_string()]));
}

#[test]
fn test_callback_can_run_a_blocking_query() {
    let dir = temp_dir();
    let index = loaded(dir.path());
    let again = Arc::clone(&index);

    let (tx, rx) = mpsc::channel();
    index.query_with("cw", QueryOptions::new(), Cancellable::new(), move |_| {
        let follow_up = again
            .query("of", QueryOptions::new(), &Cancellable::new())
            .ok()
            .and_then(Completion::done)
            .map(|m| keys_of(&m));
        let _ = tx.send(follow_up);
    });
    let keys = rx.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
    assert!(keys.contains(&"open_file".to_string()), "{:?}", keys);
}

#[test]
fn test_cancelled_query_with_reports_cancelled() {
    let dir = temp_dir();
    let index = loaded(dir.path());
    let token = Cancellable::new();
    token.cancel();

    let (tx, rx) = mpsc::channel();
    index.query_with("fo", QueryOptions::new(), token, move |outcome| {
        let _ = tx.send(outcome.map(|c| c.is_cancelled()).unwrap_or(false));
    });
    assert!(rx.recv_timeout(Duration::from_secs(10)).unwrap());
}

#[test]
fn test_try_take_eventually_yields() {
    let dir = temp_dir();
    let index = loaded(dir.path());
    let pending = index.query_async("o", QueryOptions::new().with_max_matches(2), Cancellable::new());

    let mut outcome = None;
    for _ in 0..1_000 {
        outcome = pending.try_take();
        if outcome.is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    let matches = outcome.expect("query never finished").unwrap().done().unwrap();
    assert_eq!(matches.len(), 2);
}
