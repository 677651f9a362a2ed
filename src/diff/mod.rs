//! Diff engine: Myers O(ND) bisection with heuristics, plus the cleanup
//! passes, delta codec, and HTML pretty-printer that operate on its output.
//!
//! Mirrors `packages/json-joy/src/util/diff/str.ts` and
//! `packages/json-joy/src/util/diff/str-utils.ts`, generalized with an
//! explicit deadline, half-match heuristic, line-mode collapse, and the
//! remaining cleanup/delta/pretty-print surface a full diff-match-patch
//! API exposes.

mod cleanup;
mod core;
mod delta;
mod pretty;

pub use cleanup::{cleanup_efficiency, cleanup_merge, cleanup_semantic, cleanup_semantic_lossless};
pub use core::{main, main_checklines};
pub use delta::{from_delta, to_delta};
pub use pretty::pretty_html;

/// One of the three edit tags. The integer values are not observable in the
/// public API; the delta codec uses the sign characters `=`, `-`, `+`
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Delete = -1,
    Equal = 0,
    Insert = 1,
}

/// One entry of an edit script: a tag plus its (always non-empty, except
/// transiently during cleanup) text payload.
pub type DiffOp = (Op, String);

/// An ordered edit script. See the module docs for the round-trip
/// invariants that hold once cleanup has run.
pub type Diff = Vec<DiffOp>;

/// Merge consecutive operations of the same type and discard empty ones.
/// Used both as a post-processing step and directly by callers assembling
/// a script by hand.
pub fn normalize(script: Diff) -> Diff {
    let mut result: Diff = Vec::with_capacity(script.len());
    for (op, text) in script {
        if text.is_empty() {
            continue;
        }
        match result.last_mut() {
            Some(last) if last.0 == op => last.1.push_str(&text),
            _ => result.push((op, text)),
        }
    }
    result
}

/// Reconstruct the source text: every non-INSERT payload, concatenated.
pub fn text1(script: &[DiffOp]) -> String {
    let mut out = String::new();
    for (op, text) in script {
        if *op != Op::Insert {
            out.push_str(text);
        }
    }
    out
}

/// Reconstruct the destination text: every non-DELETE payload, concatenated.
pub fn text2(script: &[DiffOp]) -> String {
    let mut out = String::new();
    for (op, text) in script {
        if *op != Op::Delete {
            out.push_str(text);
        }
    }
    out
}

/// Number of edits needed to turn text1 into text2: each maximal run of
/// DELETE/INSERT entries contributes `max(insertions, deletions)` chars,
/// reset at every EQUAL.
pub fn levenshtein(script: &[DiffOp]) -> usize {
    let mut levenshtein = 0usize;
    let mut insertions = 0usize;
    let mut deletions = 0usize;
    for (op, text) in script {
        let len = text.chars().count();
        match op {
            Op::Insert => insertions += len,
            Op::Delete => deletions += len,
            Op::Equal => {
                levenshtein += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    levenshtein + insertions.max(deletions)
}

/// Translate a char offset in the source text to the corresponding offset
/// in the destination text. If `loc` falls inside a deletion, returns the
/// destination offset of the first character after that deletion.
pub fn x_index(script: &[DiffOp], loc: usize) -> usize {
    let mut chars1 = 0usize;
    let mut chars2 = 0usize;
    let mut last_chars1 = 0usize;
    let mut last_chars2 = 0usize;
    let mut idx = 0usize;

    while idx < script.len() {
        let (op, text) = &script[idx];
        let len = text.chars().count();
        if *op != Op::Insert {
            chars1 += len;
        }
        if *op != Op::Delete {
            chars2 += len;
        }
        if chars1 > loc {
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
        idx += 1;
    }

    if idx != script.len() && script[idx].0 == Op::Delete {
        last_chars2
    } else {
        last_chars2 + (loc - last_chars1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_merges_consecutive() {
        let script = vec![
            (Op::Insert, "hello".to_string()),
            (Op::Insert, " world".to_string()),
        ];
        assert_eq!(
            normalize(script),
            vec![(Op::Insert, "hello world".to_string())]
        );
    }

    #[test]
    fn normalize_drops_empty() {
        let script = vec![
            (Op::Equal, "".to_string()),
            (Op::Insert, "hello".to_string()),
        ];
        assert_eq!(normalize(script), vec![(Op::Insert, "hello".to_string())]);
    }

    #[test]
    fn levenshtein_bound() {
        let script = main("hello world", "goodbye world", &Default::default());
        assert!(levenshtein(&script) <= "goodbye world".len().max("hello world".len()));
    }

    #[test]
    fn x_index_identity_on_equal() {
        let script = vec![(Op::Equal, "abc".to_string())];
        assert_eq!(x_index(&script, 0), 0);
        assert_eq!(x_index(&script, 3), 3);
    }

    #[test]
    fn x_index_through_delete() {
        let script = vec![
            (Op::Equal, "a".to_string()),
            (Op::Delete, "123".to_string()),
            (Op::Equal, "bc".to_string()),
        ];
        // loc 1 is the start of the deletion -> destination offset 1.
        assert_eq!(x_index(&script, 1), 1);
        // loc 2 falls inside the deletion -> snaps to 1 as well.
        assert_eq!(x_index(&script, 2), 1);
        // loc 4 is right after the deletion -> destination offset 1.
        assert_eq!(x_index(&script, 4), 1);
        // loc 5 is one char into the trailing equal.
        assert_eq!(x_index(&script, 5), 2);
    }
}
