//! Writing to disk and reading back.

use std::fs;

use fzindex::{Cancellable, Completion, Error, FuzzyIndex, IndexBuilder, Value};

use super::common::{
    builder_with, documents_of, load_through_disk, query_all, temp_dir, write_builder, COMMANDS,
};

#[test]
fn test_every_insertion_is_found_by_its_own_key() {
    let dir = temp_dir();
    let index = load_through_disk(dir.path(), false, COMMANDS);

    for &(key, document, priority) in COMMANDS {
        let matches = query_all(&index, key);
        let hit = matches
            .iter()
            .find(|m| m.key == key)
            .unwrap_or_else(|| panic!("{} not found by itself", key));
        assert_eq!(hit.document.as_str(), Some(document));
        assert_eq!(hit.priority, priority);
    }
}

#[test]
fn test_shared_document_is_stored_once() {
    let dir = temp_dir();
    let index = load_through_disk(dir.path(), false, COMMANDS);

    // open_file and file_open share "open"
    assert_eq!(index.document_count(), COMMANDS.len() - 1);
    assert_eq!(index.key_count(), COMMANDS.len());
    assert_eq!(index.lookaside_len(), COMMANDS.len());
    assert_eq!(documents_of(&query_all(&index, "open")), vec!["open"]);
}

#[test]
fn test_metadata_survives_round_trip() {
    let dir = temp_dir();
    let mut builder = IndexBuilder::new(true);
    builder.insert("k", &Value::Null, 0).unwrap();
    builder.set_metadata_string("project", "palette");
    builder.set_metadata_u32("generation", 7);
    builder.set_metadata_u64("built-at", 1_700_000_000_000);
    builder.set_metadata("scratch", Value::from("gone")).unwrap();
    builder.set_metadata("scratch", Value::Null).unwrap();

    let path = write_builder(&mut builder, dir.path(), "meta.fzi");
    let index = FuzzyIndex::load(&path).unwrap();

    assert!(index.is_case_sensitive());
    assert_eq!(index.get_metadata_string("project"), Some("palette"));
    assert_eq!(index.get_metadata_u32("generation"), Some(7));
    assert_eq!(index.get_metadata_u64("built-at"), Some(1_700_000_000_000));
    assert_eq!(index.get_metadata("scratch"), None);
    assert_eq!(index.get_metadata_u32("project"), None);
}

#[test]
fn test_second_write_is_rejected_and_target_untouched() {
    let dir = temp_dir();
    let mut builder = builder_with(false, COMMANDS);
    let first = write_builder(&mut builder, dir.path(), "first.fzi");
    let before = fs::read(&first).unwrap();

    let err = builder.write(&first, &Cancellable::new()).unwrap_err();
    assert!(matches!(err, Error::AlreadyWritten));
    let other = dir.path().join("second.fzi");
    assert!(matches!(
        builder.write(&other, &Cancellable::new()),
        Err(Error::AlreadyWritten)
    ));

    assert_eq!(fs::read(&first).unwrap(), before);
    assert!(!other.exists());
}

#[test]
fn test_cancelled_write_leaves_nothing_behind() {
    let dir = temp_dir();
    let mut builder = builder_with(false, COMMANDS);
    let path = dir.path().join("cancelled.fzi");

    let token = Cancellable::new();
    token.cancel();
    let outcome = builder.write(&path, &token).unwrap();
    assert!(outcome.is_cancelled());
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = temp_dir();
    let path = dir.path().join("index.fzi");
    fs::write(&path, b"stale").unwrap();

    let mut builder = builder_with(false, COMMANDS);
    match builder.write(&path, &Cancellable::new()).unwrap() {
        Completion::Done(()) => {}
        Completion::Cancelled => panic!("unexpected cancel"),
    }
    assert!(FuzzyIndex::load(&path).is_ok());
}

#[test]
fn test_write_into_missing_directory_is_io_error() {
    let dir = temp_dir();
    let mut builder = builder_with(false, COMMANDS);
    let path = dir.path().join("no/such/dir/index.fzi");
    let err = builder.write(&path, &Cancellable::new()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_empty_builder_writes_a_loadable_index() {
    let dir = temp_dir();
    let mut builder = IndexBuilder::new(false);
    let path = write_builder(&mut builder, dir.path(), "empty.fzi");
    let index = std::sync::Arc::new(FuzzyIndex::load(&path).unwrap());
    assert_eq!(index.key_count(), 0);
    assert!(index.characters().is_empty());
    assert!(query_all(&index, "a").is_empty());
}

#[test]
fn test_file_bytes_match_in_memory_serialization() {
    let dir = temp_dir();
    let mut builder = builder_with(false, COMMANDS);
    let in_memory = builder.to_bytes();
    let path = write_builder(&mut builder, dir.path(), "same.fzi");
    assert_eq!(fs::read(path).unwrap(), in_memory);
}

fn wrapped(levels: usize) -> Value {
    (0..levels).fold(Value::from("leaf"), |inner, _| Value::Array(vec![inner]))
}

#[test]
fn test_deepest_accepted_document_loads_back() {
    let deepest = wrapped(fzindex::binary::MAX_VALUE_DEPTH);
    let mut builder = IndexBuilder::new(false);
    let id = builder.insert("nested", &deepest, 0).unwrap();
    builder.set_metadata("nested", deepest.clone()).unwrap();

    let dir = temp_dir();
    let path = write_builder(&mut builder, dir.path(), "deep.fzi");
    let index = FuzzyIndex::load(&path).unwrap();
    assert_eq!(index.document(id), Some(deepest.clone()));
    assert_eq!(index.get_metadata("nested"), Some(&deepest));
}

#[test]
fn test_document_the_reader_would_refuse_is_not_inserted() {
    let mut builder = IndexBuilder::new(false);
    let err = builder
        .insert("nested", &wrapped(fzindex::binary::MAX_VALUE_DEPTH + 1), 0)
        .unwrap_err();
    assert!(matches!(err, Error::Capacity { .. }), "{:?}", err);

    builder.insert("flat", &Value::from("leaf"), 0).unwrap();
    let index = FuzzyIndex::from_bytes(builder.to_bytes()).unwrap();
    assert_eq!(index.document_count(), 1);
    assert_eq!(index.key(0), Some("flat"));
}
