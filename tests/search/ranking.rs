//! Ordering of results.

use fzindex::scoring;

use super::common::{index_with, keys_of, query_all, query_top, sample_index};

#[test]
fn test_priority_outranks_tightness() {
    let index = index_with(false, &[("a_______b", "loose", 0), ("ab", "tight", 1)]);
    assert_eq!(keys_of(&query_all(&index, "ab")), vec!["a_______b", "ab"]);
}

#[test]
fn test_tighter_gap_wins_at_equal_priority() {
    let index = index_with(false, &[("a__b", "gap", 4), ("ab", "adjacent", 4)]);
    assert_eq!(keys_of(&query_all(&index, "ab")), vec!["ab", "a__b"]);
}

#[test]
fn test_earlier_start_wins_at_equal_priority() {
    let index = index_with(false, &[("xxab", "late", 0), ("abxx", "early", 0)]);
    assert_eq!(keys_of(&query_all(&index, "ab")), vec!["abxx", "xxab"]);
}

#[test]
fn test_equal_scores_fall_back_to_key_order() {
    let index = index_with(false, &[("zab", "z", 2), ("yab", "y", 2), ("xab", "x", 2)]);
    let matches = query_all(&index, "ab");
    assert_eq!(keys_of(&matches), vec!["xab", "yab", "zab"]);
    assert_eq!(matches.score(0), matches.score(2));
}

#[test]
fn test_score_follows_formula() {
    let index = index_with(false, &[("foo_bar", "DocA", 0)]);
    let matches = query_all(&index, "fb");
    // f@0 (anchor cost 0), b@4 (gap 4)
    assert_eq!(matches.score(0), Some(scoring::score(0, 4, 4)));

    let expected = (1.0 / 256.0) / 9.0 + 255.0 / 256.0;
    assert!((matches.score(0).unwrap() - expected).abs() < 1e-6);
}

#[test]
fn test_cheapest_alignment_of_a_key_is_kept() {
    let index = index_with(false, &[("abab", "doc", 0)]);
    let matches = query_all(&index, "ab");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches.score(0), Some(scoring::score(0, 1, 1)));
}

#[test]
fn test_truncation_keeps_the_top_of_the_full_order() {
    let index = sample_index();
    let all = keys_of(&query_all(&index, "o"));
    assert_eq!(all.len(), 5);
    for m in 1..=all.len() + 1 {
        let top = keys_of(&query_top(&index, "o", m));
        assert_eq!(top, all[..m.min(all.len())].to_vec());
    }
}

#[test]
fn test_scores_never_increase_down_the_list() {
    let index = sample_index();
    for query in ["o", "oe", "fo", "e", "_"] {
        let matches = query_all(&index, query);
        let scores: Vec<f32> = (0..matches.len()).filter_map(|i| matches.score(i)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{}: {:?}", query, scores);
    }
}
