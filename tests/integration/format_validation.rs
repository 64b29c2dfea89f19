//! Rejection of damaged or foreign files.

use std::collections::BTreeMap;
use std::fs;

use fzindex::binary::{self, write_container, FOOTER_MAGIC, HEADER_SIZE, MAGIC};
use fzindex::{Error, FuzzyIndex, Value};

use super::common::{builder_with, flip_bit, temp_dir, write_builder, COMMANDS};

/// A minimal well-formed root with `version`, optionally missing `drop`.
fn root_bytes(version: Value, drop: Option<&str>) -> Vec<u8> {
    let mut metadata = BTreeMap::new();
    metadata.insert("case-sensitive".to_string(), Value::Bool(false));

    let mut root = BTreeMap::new();
    root.insert("version".to_string(), version);
    root.insert("metadata".to_string(), Value::Dict(metadata));
    root.insert("keys".to_string(), Value::Array(vec![]));
    root.insert("documents".to_string(), Value::Array(vec![]));
    root.insert("lookaside".to_string(), Value::Pairs(vec![]));
    root.insert("tables".to_string(), Value::Dict(BTreeMap::new()));
    if let Some(name) = drop {
        root.remove(name);
    }
    write_container(&binary::to_bytes(&Value::Dict(root)))
}

#[test]
fn test_hand_built_minimal_root_loads() {
    let index = FuzzyIndex::from_bytes(root_bytes(Value::I32(1), None)).unwrap();
    assert_eq!(index.key_count(), 0);
}

#[test]
fn test_future_version_is_version_mismatch() {
    let err = FuzzyIndex::from_bytes(root_bytes(Value::I32(2), None)).unwrap_err();
    assert!(matches!(err, Error::VersionMismatch { found: 2, expected: 1 }));
}

#[test]
fn test_each_missing_section_is_named() {
    for name in ["keys", "documents", "tables", "metadata", "lookaside"] {
        let err = FuzzyIndex::from_bytes(root_bytes(Value::I32(1), Some(name))).unwrap_err();
        match err {
            Error::MissingSection(missing) => assert_eq!(missing, name),
            other => panic!("expected MissingSection({}), got {:?}", name, other),
        }
    }
}

#[test]
fn test_missing_version_is_format_error() {
    let err = FuzzyIndex::from_bytes(root_bytes(Value::I32(1), Some("version"))).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}

#[test]
fn test_corrupted_file_fails_checksum() {
    let dir = temp_dir();
    let mut builder = builder_with(false, COMMANDS);
    let path = write_builder(&mut builder, dir.path(), "index.fzi");
    flip_bit(&path, HEADER_SIZE + 10);

    let err = FuzzyIndex::load(&path).unwrap_err();
    assert!(err.is_format_error(), "{:?}", err);
}

#[test]
fn test_foreign_magic_is_rejected() {
    let mut bytes = builder_with(false, COMMANDS).to_bytes();
    bytes[..MAGIC.len()].copy_from_slice(b"SRXF");
    assert!(matches!(FuzzyIndex::from_bytes(bytes), Err(Error::Format(_))));

    let mut bytes = builder_with(false, COMMANDS).to_bytes();
    let end = bytes.len();
    bytes[end - FOOTER_MAGIC.len()..].copy_from_slice(b"NOPE");
    assert!(matches!(FuzzyIndex::from_bytes(bytes), Err(Error::Format(_))));
}

#[test]
fn test_truncated_files_are_rejected() {
    let bytes = builder_with(false, COMMANDS).to_bytes();
    for len in [0, 3, 8, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            FuzzyIndex::from_bytes(bytes[..len].to_vec()).is_err(),
            "accepted {} of {} bytes",
            len,
            bytes.len()
        );
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = temp_dir();
    let err = FuzzyIndex::load(dir.path().join("absent.fzi")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(!err.is_format_error());
}

#[test]
fn test_text_file_is_rejected() {
    let dir = temp_dir();
    let path = dir.path().join("notes.fzi");
    fs::write(&path, "this is not an index, just some notes\n").unwrap();
    assert!(FuzzyIndex::load(&path).unwrap_err().is_format_error());
}

#[test]
fn test_lookaside_pointing_past_keys_is_rejected() {
    let mut metadata = BTreeMap::new();
    metadata.insert("case-sensitive".to_string(), Value::Bool(false));
    let mut root = BTreeMap::new();
    root.insert("version".to_string(), Value::I32(1));
    root.insert("metadata".to_string(), Value::Dict(metadata));
    root.insert("keys".to_string(), Value::Array(vec![Value::from("a")]));
    root.insert("documents".to_string(), Value::Array(vec![Value::Null]));
    // key id 5 does not exist
    root.insert("lookaside".to_string(), Value::Pairs(vec![(5, 0)]));
    root.insert("tables".to_string(), Value::Dict(BTreeMap::new()));
    let bytes = write_container(&binary::to_bytes(&Value::Dict(root)));

    assert!(matches!(FuzzyIndex::from_bytes(bytes), Err(Error::Format(_))));
}
