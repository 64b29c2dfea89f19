//! Case handling at build time and query time.

use fzindex::{Cancellable, QueryOptions};

use super::common::{index_with, keys_of, query_all};

#[test]
fn test_folded_index_ignores_case_in_both_directions() {
    let index = index_with(false, &[("FooBar", "doc", 0)]);
    assert!(!index.is_case_sensitive());
    assert_eq!(keys_of(&query_all(&index, "fb")), vec!["FooBar"]);
    assert_eq!(keys_of(&query_all(&index, "FB")), vec!["FooBar"]);
    assert_eq!(keys_of(&query_all(&index, "fOoBaR")), vec!["FooBar"]);
}

#[test]
fn test_sensitive_index_needs_exact_case() {
    let index = index_with(true, &[("FooBar", "doc", 0)]);
    assert!(index.is_case_sensitive());
    assert_eq!(keys_of(&query_all(&index, "FB")), vec!["FooBar"]);
    assert!(query_all(&index, "fb").is_empty());
    assert!(index.has_table('F'));
    assert!(!index.has_table('f'));
}

#[test]
fn test_query_override_on_folded_index() {
    let index = index_with(false, &[("FooBar", "doc", 0)]);
    let exact = QueryOptions::new().with_case_sensitive(true);
    let run = |text: &str| {
        index
            .query_in_place(text, exact, &Cancellable::new())
            .done()
            .unwrap()
    };
    // only folded characters were indexed
    assert!(run("FB").is_empty());
    assert_eq!(keys_of(&run("fb")), vec!["FooBar"]);
}

#[test]
fn test_query_override_on_sensitive_index() {
    let index = index_with(true, &[("FooBar", "doc", 0)]);
    let folded = QueryOptions::new().with_case_sensitive(false);
    let matches = index
        .query_in_place("OA", folded, &Cancellable::new())
        .done()
        .unwrap();
    assert_eq!(keys_of(&matches), vec!["FooBar"]);
}

#[test]
fn test_non_ascii_letters_fold() {
    let index = index_with(false, &[("Ärger_Öl", "umlauts", 0), ("ΣΟΦΙΑ", "greek", 0)]);
    assert_eq!(keys_of(&query_all(&index, "äö")), vec!["Ärger_Öl"]);
    assert_eq!(keys_of(&query_all(&index, "ÄÖ")), vec!["Ärger_Öl"]);
    assert_eq!(keys_of(&query_all(&index, "σφ")), vec!["ΣΟΦΙΑ"]);
}
