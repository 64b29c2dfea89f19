//! The `FuzzyMatches` sequence: access, filtering, change notification.

use std::sync::{Arc, Mutex};

use super::common::{keys_of, query_all, sample_index};

#[test]
fn test_matches_keep_index_alive() {
    let index = sample_index();
    let matches = query_all(&index, "fb");
    drop(index);
    assert_eq!(matches.query(), "fb");
    let first = matches.get(0).unwrap();
    assert_eq!(first.key, "foo_bar");
    assert_eq!(first.document.as_str(), Some("DocA"));
    assert_eq!(Arc::strong_count(matches.index()), 1);
}

#[test]
fn test_iter_agrees_with_get() {
    let index = sample_index();
    let matches = query_all(&index, "o");
    let via_iter: Vec<_> = matches.iter().collect();
    assert_eq!(via_iter.len(), matches.len());
    for (i, m) in via_iter.iter().enumerate() {
        assert_eq!(Some(m.clone()), matches.get(i));
    }
    assert!(matches.get(matches.len()).is_none());
}

#[test]
fn test_retain_filters_and_notifies() {
    let index = sample_index();
    let mut matches = query_all(&index, "o");
    let before = keys_of(&matches);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    matches.connect_items_changed(move |position, removed, added| {
        sink.lock().unwrap().push((position, removed, added));
    });

    matches.retain(|m| m.priority < 2);
    let after = keys_of(&matches);
    assert_eq!(after, vec!["foo_bar", "foo_baz"]);

    let removed: usize = events.lock().unwrap().iter().map(|e| e.1).sum();
    assert_eq!(removed, before.len() - after.len());
    assert!(events.lock().unwrap().iter().all(|e| e.2 == 0));
}

#[test]
fn test_retain_everything_is_silent() {
    let index = sample_index();
    let mut matches = query_all(&index, "o");
    let calls = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&calls);
    matches.connect_items_changed(move |_, _, _| *sink.lock().unwrap() += 1);
    matches.retain(|_| true);
    assert_eq!(*calls.lock().unwrap(), 0);
}
