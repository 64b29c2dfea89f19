//! One result per document for multi-character queries.

use std::collections::HashSet;

use super::common::{index_with, keys_of, query_all, sample_index};

#[test]
fn test_shared_document_reported_once_with_best_key() {
    let index = sample_index();
    let matches = query_all(&index, "oe");
    let keys = keys_of(&matches);
    // open_file aligns at o@0, file_open only at o@5
    assert!(keys.contains(&"open_file".to_string()));
    assert!(!keys.contains(&"file_open".to_string()));
    assert!(keys.contains(&"close_window".to_string()));
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_single_character_query_is_not_deduplicated() {
    let index = sample_index();
    let keys = keys_of(&query_all(&index, "f"));
    assert_eq!(keys.len(), 4);
    assert!(keys.contains(&"open_file".to_string()));
    assert!(keys.contains(&"file_open".to_string()));
}

#[test]
fn test_same_key_inserted_twice_for_one_document() {
    let index = index_with(false, &[("alpha", "doc", 3), ("alpha", "doc", 3)]);
    assert_eq!(index.lookaside_len(), 2);
    assert_eq!(index.document_count(), 1);
    assert_eq!(query_all(&index, "ap").len(), 1);
    assert_eq!(query_all(&index, "a").len(), 2);
}

#[test]
fn test_better_priority_wins_over_tighter_match() {
    let index = index_with(false, &[("ab", "doc", 5), ("a__b", "doc", 0)]);
    let matches = query_all(&index, "ab");
    assert_eq!(keys_of(&matches), vec!["a__b"]);
    assert_eq!(matches.get(0).unwrap().priority, 0);
}

#[test]
fn test_equal_scores_keep_earliest_insertion() {
    let index = index_with(false, &[("yab", "doc", 0), ("xab", "doc", 0)]);
    assert_eq!(keys_of(&query_all(&index, "ab")), vec!["yab"]);

    let index = index_with(false, &[("xab", "doc", 0), ("yab", "doc", 0)]);
    assert_eq!(keys_of(&query_all(&index, "ab")), vec!["xab"]);
}

#[test]
fn test_document_ids_are_unique_in_results() {
    let entries: Vec<(String, String, u8)> = (0..40)
        .map(|i| (format!("key_{:02}_end", i), format!("doc{}", i % 7), (i % 3) as u8))
        .collect();
    let borrowed: Vec<(&str, &str, u8)> = entries
        .iter()
        .map(|(k, d, p)| (k.as_str(), d.as_str(), *p))
        .collect();
    let index = index_with(false, &borrowed);

    let matches = query_all(&index, "ke");
    let ids: HashSet<u32> = matches.iter().map(|m| m.document_id).collect();
    assert_eq!(ids.len(), matches.len());
    assert_eq!(matches.len(), 7);
}
