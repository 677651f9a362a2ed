//! Property-based tests for the universally-quantified laws the diff/match/
//! patch engines are expected to hold ("for all a, b..."): the fixture
//! tests colocated with each module only exercise a handful of fixed
//! example pairs, so these proptest-driven checks generate arbitrary
//! strings instead.
//!
//! Grounded on the proptest-over-text-diff idiom in
//! `diff_to_yjs_property.rs`/`crdt_convergence_property.rs`: a small
//! interesting-character strategy mixing ASCII, whitespace, and multi-byte
//! Unicode, run through a handful of `proptest!` blocks with a bounded case
//! count.

use proptest::collection::vec;
use proptest::prelude::*;

use difftext::diff;
use difftext::match_engine;
use difftext::patch;
use difftext::Options;

fn interesting_char() -> impl Strategy<Value = char> {
    prop_oneof![
        (b'a'..=b'z').prop_map(char::from),
        (b'A'..=b'Z').prop_map(char::from),
        (b'0'..=b'9').prop_map(char::from),
        Just(' '),
        Just('\n'),
        Just('\t'),
        Just('.'),
        Just(','),
        Just('-'),
        Just('_'),
        Just('\u{1F642}'), // multi-byte emoji
        Just('\u{4E2D}'),  // CJK
        Just('\u{05E9}'),  // Hebrew
    ]
}

fn arbitrary_string(max_len: usize) -> impl Strategy<Value = String> {
    vec(interesting_char(), 0..max_len).prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_shrink_iters: 128,
        .. ProptestConfig::default()
    })]

    /// `diffText1(diff(a, b)) == a && diffText2(diff(a, b)) == b`.
    #[test]
    fn diff_round_trip(a in arbitrary_string(80), b in arbitrary_string(80)) {
        let opts = Options::default();
        let script = diff::main(&a, &b, &opts);
        prop_assert_eq!(diff::text1(&script), a);
        prop_assert_eq!(diff::text2(&script), b);
    }

    /// `diffLevenshtein(diff(a,b)) <= max(|a|,|b|)`.
    #[test]
    fn levenshtein_bound(a in arbitrary_string(80), b in arbitrary_string(80)) {
        let opts = Options::default();
        let script = diff::main(&a, &b, &opts);
        let bound = a.chars().count().max(b.chars().count());
        prop_assert!(diff::levenshtein(&script) <= bound);
    }

    /// `diffFromDelta(diffText1(d), diffToDelta(d)) == d` for any script
    /// produced by `diff::main`.
    #[test]
    fn delta_round_trip(a in arbitrary_string(80), b in arbitrary_string(80)) {
        let opts = Options::default();
        let script = diff::main(&a, &b, &opts);
        let delta = diff::to_delta(&script);
        let decoded = diff::from_delta(&a, &delta).unwrap();
        prop_assert_eq!(decoded, script);
    }

    /// `xIndex` is monotone non-decreasing in its second argument.
    #[test]
    fn x_index_monotone(a in arbitrary_string(60), b in arbitrary_string(60)) {
        let opts = Options::default();
        let script = diff::main(&a, &b, &opts);
        let len = a.chars().count();
        let mut prev = 0usize;
        for loc in 0..=len {
            let cur = diff::x_index(&script, loc);
            prop_assert!(cur >= prev);
            prev = cur;
        }
    }

    /// `patchToText(patchFromText(s)) == s` for any string produced by
    /// `patchToText`.
    #[test]
    fn patch_text_round_trip(a in arbitrary_string(60), b in arbitrary_string(60)) {
        let opts = Options::default();
        let patches = patch::make(&a, &b, &opts);
        let text = patch::to_text(&patches);
        let parsed = patch::from_text(&text).unwrap();
        prop_assert_eq!(patch::to_text(&parsed), text);
    }

    /// Applying `patchMake(a, b)` to `a` yields `(b, [true, ...])`.
    #[test]
    fn patch_idempotence_on_source_text(a in arbitrary_string(80), b in arbitrary_string(80)) {
        let opts = Options::default();
        let patches = patch::make(&a, &b, &opts);
        let (patched, results) = patch::apply(&patches, &a, &opts);
        prop_assert_eq!(patched, b);
        prop_assert!(results.iter().all(|&ok| ok));
    }

    /// `patchToText` of the list is unchanged across a call to
    /// `patchApply` (the apply routine deep-copies before mutating).
    #[test]
    fn apply_does_not_mutate_input_patches(a in arbitrary_string(60), b in arbitrary_string(60)) {
        let opts = Options::default();
        let patches = patch::make(&a, &b, &opts);
        let before = patch::to_text(&patches);
        let _ = patch::apply(&patches, &a, &opts);
        let after = patch::to_text(&patches);
        prop_assert_eq!(before, after);
    }

    /// If `pattern` occurs in `text`, `match` returns some occurrence; if
    /// it occurs at `loc`, it returns exactly `loc`.
    #[test]
    fn bitap_finds_exact_occurrence(
        prefix in arbitrary_string(20),
        pattern in vec(interesting_char(), 1..16).prop_map(|c| c.into_iter().collect::<String>()),
        suffix in arbitrary_string(20),
    ) {
        let text = format!("{prefix}{pattern}{suffix}");
        let loc = prefix.chars().count();
        let opts = Options::default();
        let found = match_engine::locate(&text, &pattern, loc, &opts).unwrap();
        prop_assert_eq!(found, Some(loc));
    }
}

#[test]
fn patch_no_op_on_unrelated_text() {
    // A strict threshold/distance (matchThreshold=0, matchDistance=0)
    // rejects any relocation that is not a pixel-perfect anchor, which makes
    // the no-op law deterministic instead of dependent on how fuzzy the
    // default tolerance happens to be.
    let opts = Options {
        match_threshold: 0.0,
        match_distance: 0,
        ..Options::default()
    };
    let a = "The quick brown fox jumps over the lazy dog.";
    let b = "The quick brown fox jumped over a lazy dog.";
    let patches = patch::make(a, b, &opts);

    let unrelated = "completely different content that shares nothing with the source";
    let (patched, results) = patch::apply(&patches, unrelated, &opts);
    assert_eq!(patched, unrelated);
    assert!(results.iter().all(|&ok| !ok));
}

#[test]
fn diff_round_trip_boundaries() {
    let opts = Options::default();
    for (a, b) in [("", ""), ("", "hello"), ("hello", ""), ("same", "same")] {
        let script = diff::main(a, b, &opts);
        assert_eq!(diff::text1(&script), a);
        assert_eq!(diff::text2(&script), b);
    }
}
