//! Result order and truncation.

use proptest::prelude::*;

use super::common::{index_with, keys_of, query_all, query_top};

fn corpus_strategy() -> impl Strategy<Value = Vec<(String, u8)>> {
    prop::collection::vec(
        (prop::string::string_regex("[a-d_]{1,9}").unwrap(), 0u8..6),
        1..16,
    )
}

fn build(corpus: &[(String, u8)]) -> std::sync::Arc<fzindex::FuzzyIndex> {
    let docs: Vec<String> = (0..corpus.len()).map(|i| format!("doc{}", i)).collect();
    let entries: Vec<(&str, &str, u8)> = corpus
        .iter()
        .zip(&docs)
        .map(|((key, priority), doc)| (key.as_str(), doc.as_str(), *priority))
        .collect();
    index_with(false, &entries)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Property: scores never increase, and equal scores are in key order.
    #[test]
    fn prop_results_are_sorted(
        corpus in corpus_strategy(),
        query in prop::string::string_regex("[a-d]{1,3}").unwrap(),
    ) {
        let index = build(&corpus);
        let matches = query_all(&index, &query);
        let rows: Vec<(f32, &str)> = (0..matches.len())
            .map(|i| (matches.score(i).unwrap(), matches.key(i).unwrap()))
            .collect();
        for pair in rows.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(
                a.0 > b.0 || (a.0 == b.0 && a.1.as_bytes() <= b.1.as_bytes()),
                "{:?} before {:?}", a, b
            );
        }
    }

    /// Property: `max_matches = m` returns the first `m` of the full order.
    #[test]
    fn prop_truncation_is_a_prefix(
        corpus in corpus_strategy(),
        query in prop::string::string_regex("[a-d]{1,3}").unwrap(),
        m in 1usize..20,
    ) {
        let index = build(&corpus);
        let all = keys_of(&query_all(&index, &query));
        let top = keys_of(&query_top(&index, &query, m));
        prop_assert!(top.len() <= m);
        prop_assert_eq!(&top[..], &all[..m.min(all.len())]);
    }

    /// Property: the same key at two priorities ranks the lower value first.
    #[test]
    fn prop_lower_priority_value_ranks_first(
        key in prop::string::string_regex("[a-z]{1,8}").unwrap(),
        first in 0u8..=255,
        second in 0u8..=255,
    ) {
        prop_assume!(first != second);
        let index = index_with(false, &[(key.as_str(), "first", first), (key.as_str(), "second", second)]);
        let matches = query_all(&index, &key);
        prop_assert_eq!(matches.len(), 2);

        let leader = matches.get(0).unwrap();
        prop_assert_eq!(leader.priority, first.min(second));
        prop_assert!(matches.score(0) > matches.score(1));
    }
}
