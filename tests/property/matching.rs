//! Which keys match: the index against a brute-force subsequence oracle.

use std::collections::HashSet;

use proptest::prelude::*;

use super::common::{index_with, is_subsequence, keys_of, query_all};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Keys over a small alphabet so that random queries hit often.
fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e_]{1,10}").unwrap()
}

fn query_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e]{1,4}").unwrap()
}

/// `(key, priority)` insertions, each with its own document.
fn insertions_strategy() -> impl Strategy<Value = Vec<(String, u8)>> {
    prop::collection::vec((key_strategy(), 0u8..4), 1..12)
}

fn entries(insertions: &[(String, u8)], document_of: impl Fn(usize) -> String) -> Vec<(String, String, u8)> {
    insertions
        .iter()
        .enumerate()
        .map(|(i, (key, priority))| (key.clone(), document_of(i), *priority))
        .collect()
}

fn borrow(entries: &[(String, String, u8)]) -> Vec<(&str, &str, u8)> {
    entries
        .iter()
        .map(|(k, d, p)| (k.as_str(), d.as_str(), *p))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Property: with one document per insertion, the results are exactly
    /// the insertions whose key contains the query as a subsequence.
    #[test]
    fn prop_results_equal_subsequence_oracle(
        insertions in insertions_strategy(),
        query in query_strategy(),
    ) {
        let owned = entries(&insertions, |i| format!("doc{}", i));
        let index = index_with(false, &borrow(&owned));

        let mut found = keys_of(&query_all(&index, &query));
        let mut expected: Vec<String> = insertions
            .iter()
            .filter(|(key, _)| is_subsequence(&query, key))
            .map(|(key, _)| key.clone())
            .collect();
        found.sort();
        expected.sort();
        prop_assert_eq!(found, expected, "query {:?}", query);
    }

    /// Property: every in-order selection of a key's characters finds that key.
    #[test]
    fn prop_every_subsequence_finds_its_key(
        key in prop::string::string_regex("[a-z]{1,12}").unwrap(),
        mask in prop::collection::vec(any::<bool>(), 12),
        others in prop::collection::vec(key_strategy(), 0..6),
    ) {
        let query: String = key
            .chars()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(c, _)| c)
            .collect();
        prop_assume!(!query.is_empty());

        let mut owned = vec![(key.clone(), "target".to_string(), 0u8)];
        for (i, other) in others.iter().enumerate() {
            owned.push((other.clone(), format!("other{}", i), 0));
        }
        let index = index_with(false, &borrow(&owned));

        let matches = query_all(&index, &query);
        prop_assert!(
            matches.iter().any(|m| m.key == key),
            "{:?} did not find {:?}", query, key
        );
    }

    /// Property: a query containing a character no key has matches nothing.
    #[test]
    fn prop_foreign_character_matches_nothing(
        insertions in insertions_strategy(),
        query in query_strategy(),
        at in 0usize..5,
    ) {
        let owned = entries(&insertions, |i| format!("doc{}", i));
        let index = index_with(false, &borrow(&owned));

        let mut chars: Vec<char> = query.chars().collect();
        chars.insert(at.min(chars.len()), 'z');
        let query: String = chars.into_iter().collect();
        prop_assert!(query_all(&index, &query).is_empty());
    }

    /// Property: multi-character results carry each document at most once,
    /// and every document with a matching key is present.
    #[test]
    fn prop_one_result_per_document(
        insertions in insertions_strategy(),
        query in prop::string::string_regex("[a-e]{2,4}").unwrap(),
    ) {
        let owned = entries(&insertions, |i| format!("doc{}", i % 3));
        let index = index_with(false, &borrow(&owned));
        let matches = query_all(&index, &query);

        let documents: Vec<String> = matches
            .iter()
            .filter_map(|m| m.document.as_str().map(str::to_string))
            .collect();
        let unique: HashSet<&String> = documents.iter().collect();
        prop_assert_eq!(unique.len(), documents.len());

        let expected: HashSet<&String> = owned
            .iter()
            .filter(|(key, _, _)| is_subsequence(&query, key))
            .map(|(_, doc, _)| doc)
            .collect();
        prop_assert_eq!(unique, expected);
    }
}
