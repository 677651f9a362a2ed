//! Primitive string operations shared by the diff, match, and patch engines.
//!
//! Mirrors the binary-search prefix/suffix/overlap helpers from
//! `packages/json-joy/src/util/diff/str.ts` and the occurrence counter from
//! `packages/json-joy/src/util/strCnt.ts`, generalized for reuse outside the
//! diff core.
//!
//! Internal indexing stays in Rust `char`s (Unicode scalar values), since
//! Rust's `String` can't represent a lone surrogate half and a full
//! UTF-16-unit internal representation would need one. The delta and patch
//! wire codecs still owe callers UTF-16 code-unit offsets and lengths, so
//! [`utf16_len`] and [`utf16_advance`] convert at that boundary.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters `encodeURI` would escape: control chars (from `CONTROLS`)
/// plus space and the handful of ASCII punctuation it never leaves bare.
/// Shared by the delta codec and the patch text codec, both of which mirror
/// `encodeURI`/`decodeURI` wire semantics.
const URI_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `encodeURI`-style percent-encoding, with `%20` rewritten back to a
/// literal space for readability.
pub(crate) fn uri_encode(text: &str) -> String {
    utf8_percent_encode(text, URI_ENCODE_SET)
        .to_string()
        .replace("%20", " ")
}

/// `decodeURI`-style percent-decoding. Returns `None` on a malformed `%XX`
/// escape or invalid UTF-8, leaving the caller to attach its own error type.
pub(crate) fn uri_decode(escaped: &str) -> Option<String> {
    if !valid_percent_escapes(escaped) {
        return None;
    }
    percent_encoding::percent_decode_str(escaped)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

fn valid_percent_escapes(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            let valid = hex
                .map(|h| h.iter().all(|b| b.is_ascii_hexdigit()))
                .unwrap_or(false);
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Length of the longest common prefix of `text1` and `text2`, in chars.
pub fn common_prefix(text1: &str, text2: &str) -> usize {
    common_prefix_chars(
        &text1.chars().collect::<Vec<_>>(),
        &text2.chars().collect::<Vec<_>>(),
    )
}

/// Length of the longest common suffix of `text1` and `text2`, in chars.
pub fn common_suffix(text1: &str, text2: &str) -> usize {
    common_suffix_chars(
        &text1.chars().collect::<Vec<_>>(),
        &text2.chars().collect::<Vec<_>>(),
    )
}

/// Length of the longest suffix of `text1` that is also a prefix of `text2`.
pub fn common_overlap(text1: &str, text2: &str) -> usize {
    let c1: Vec<char> = text1.chars().collect();
    let c2: Vec<char> = text2.chars().collect();
    common_overlap_chars(&c1, &c2)
}

/// Counts non-overlapping occurrences of `needle` in `haystack`, scanning
/// char-by-char from `offset`.
pub fn count_occurrences(needle: &str, haystack: &str, offset: usize) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let hay: Vec<char> = haystack.chars().collect();
    let ned: Vec<char> = needle.chars().collect();
    if offset > hay.len() {
        return 0;
    }
    let mut count = 0;
    let mut pos = offset;
    while let Some(found) = find_char_slice(&hay[pos..], &ned) {
        count += 1;
        pos += found + ned.len();
        if pos > hay.len() {
            break;
        }
    }
    count
}

/// Whether `needle` occurs at more than one distinct (possibly overlapping)
/// start position in `haystack`. Used by `patch::add_context` to decide
/// whether a context pattern is still ambiguous: `"aa"` in `"aaa"` occurs at
/// both index 0 and index 1, so this returns `true` even though the two
/// occurrences overlap and a non-overlapping scan would only find one.
pub fn has_ambiguous_occurrence(needle: &[char], haystack: &[char]) -> bool {
    match index_of(haystack, needle, 0) {
        None => false,
        Some(first) => last_index_of(haystack, needle, haystack.len()) != Some(first),
    }
}

/// UTF-16 code-unit length of `text` (1 per BMP char, 2 per astral-plane
/// char), for wire formats that owe callers UTF-16 offsets/lengths.
pub(crate) fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Walks `chars` forward from `start`, consuming exactly `units` UTF-16 code
/// units, and returns the resulting char index. `None` if `units` runs past
/// the end of `chars` or lands in the middle of a surrogate pair (i.e. a
/// single char's 2-unit width is only partially consumed).
pub(crate) fn utf16_advance(chars: &[char], start: usize, units: usize) -> Option<usize> {
    let mut remaining = units;
    let mut idx = start;
    while remaining > 0 {
        let c = chars.get(idx)?;
        let width = c.len_utf16();
        if width > remaining {
            return None;
        }
        remaining -= width;
        idx += 1;
    }
    Some(idx)
}

/// First char-index of `needle` in `haystack` at or after `from`, if any.
pub fn index_of(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if from >= haystack.len() || needle.len() > haystack.len() - from {
        return None;
    }
    find_char_slice(&haystack[from..], needle).map(|i| i + from)
}

/// Last char-index of `needle` in `haystack` at or before `from`, if any.
pub fn last_index_of(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if needle.len() > haystack.len() {
        return None;
    }
    let end = (from + needle.len()).min(haystack.len());
    if end < needle.len() {
        return None;
    }
    haystack[..end].windows(needle.len()).rposition(|w| w == needle)
}

pub(crate) fn common_prefix_chars(c1: &[char], c2: &[char]) -> usize {
    if c1.is_empty() || c2.is_empty() || c1[0] != c2[0] {
        return 0;
    }
    let mut min = 0usize;
    let mut max = c1.len().min(c2.len());
    let mut mid = max;
    let mut start = 0;
    while min < mid {
        if c1[start..mid] == c2[start..mid] {
            min = mid;
            start = min;
        } else {
            max = mid;
        }
        mid = (max - min) / 2 + min;
    }
    mid
}

pub(crate) fn common_suffix_chars(c1: &[char], c2: &[char]) -> usize {
    let n1 = c1.len();
    let n2 = c2.len();
    if n1 == 0 || n2 == 0 || c1[n1 - 1] != c2[n2 - 1] {
        return 0;
    }
    let mut min = 0usize;
    let mut max = n1.min(n2);
    let mut mid = max;
    let mut end = 0;
    while min < mid {
        if c1[n1 - mid..n1 - end] == c2[n2 - mid..n2 - end] {
            min = mid;
            end = min;
        } else {
            max = mid;
        }
        mid = (max - min) / 2 + min;
    }
    mid
}

pub(crate) fn common_overlap_chars(c1: &[char], c2: &[char]) -> usize {
    let n1 = c1.len();
    let n2 = c2.len();
    if n1 == 0 || n2 == 0 {
        return 0;
    }

    let min_len = n1.min(n2);
    let c1_trim = if n1 > n2 { &c1[n1 - n2..] } else { c1 };
    let c2_trim = if n1 < n2 { &c2[..n1] } else { c2 };

    if c1_trim == c2_trim {
        return min_len;
    }

    let mut best = 0usize;
    let mut length = 1usize;
    loop {
        let pattern = &c1_trim[min_len - length..];
        match find_char_slice(c2_trim, pattern) {
            None => return best,
            Some(found) => {
                length += found;
                if found == 0 || c1_trim[min_len - length..] == c2_trim[..length] {
                    best = length;
                    length += 1;
                }
            }
        }
    }
}

/// First occurrence of `needle` in `haystack`, returning the starting index.
pub(crate) fn find_char_slice(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub(crate) fn chars_to_string(chars: &[char]) -> String {
    chars.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_empty() {
        assert_eq!(common_prefix("", "hello"), 0);
        assert_eq!(common_prefix("hello", ""), 0);
    }

    #[test]
    fn prefix_basic() {
        assert_eq!(common_prefix("hello", "helloworld"), 5);
        assert_eq!(common_prefix("abc", "abd"), 2);
        assert_eq!(common_prefix("abc", "xyz"), 0);
    }

    #[test]
    fn suffix_basic() {
        assert_eq!(common_suffix("hello", "world"), 0);
        assert_eq!(common_suffix("hello", "jello"), 4);
        assert_eq!(common_suffix("abc", "bc"), 2);
    }

    #[test]
    fn overlap_basic() {
        assert_eq!(common_overlap("abcxxx", "xxxdef"), 3);
        assert_eq!(common_overlap("abc", "abc"), 3);
        assert_eq!(common_overlap("abc", "xyz"), 0);
    }

    #[test]
    fn count_occurrences_basic() {
        assert_eq!(count_occurrences("a", "banana", 0), 3);
        assert_eq!(count_occurrences("na", "banana", 0), 2);
        assert_eq!(count_occurrences("x", "banana", 0), 0);
        assert_eq!(count_occurrences("a", "banana", 2), 2);
    }

    #[test]
    fn empty_needle_counts_zero() {
        assert_eq!(count_occurrences("", "hello", 0), 0);
    }

    #[test]
    fn uri_round_trip() {
        let encoded = uri_encode("50% off! <tag>");
        assert_eq!(encoded, "50%25 off! %3Ctag%3E");
        let decoded = uri_decode(&encoded).unwrap();
        assert_eq!(decoded, "50% off! <tag>");
    }

    #[test]
    fn uri_decode_rejects_malformed_escape() {
        assert_eq!(uri_decode("%zz"), None);
    }

    #[test]
    fn index_of_and_last_index_of() {
        let hay: Vec<char> = "abcabcabc".chars().collect();
        let needle: Vec<char> = "abc".chars().collect();
        assert_eq!(index_of(&hay, &needle, 0), Some(0));
        assert_eq!(index_of(&hay, &needle, 1), Some(3));
        assert_eq!(last_index_of(&hay, &needle, 8), Some(6));
        assert_eq!(last_index_of(&hay, &needle, 5), Some(3));
    }

    #[test]
    fn ambiguous_occurrence_detects_overlap() {
        let hay: Vec<char> = "aaa".chars().collect();
        let needle: Vec<char> = "aa".chars().collect();
        assert!(has_ambiguous_occurrence(&needle, &hay));
    }

    #[test]
    fn ambiguous_occurrence_single_match_is_unambiguous() {
        let hay: Vec<char> = "banana".chars().collect();
        let needle: Vec<char> = "nan".chars().collect();
        assert!(!has_ambiguous_occurrence(&needle, &hay));
    }

    #[test]
    fn ambiguous_occurrence_non_overlapping_repeats() {
        let hay: Vec<char> = "banana".chars().collect();
        let needle: Vec<char> = "a".chars().collect();
        assert!(has_ambiguous_occurrence(&needle, &hay));
    }

    #[test]
    fn utf16_len_counts_surrogate_pairs() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("\u{1F642}"), 2);
        assert_eq!(utf16_len("a\u{1F642}b"), 4);
    }

    #[test]
    fn utf16_advance_lands_on_char_boundaries() {
        let chars: Vec<char> = "a\u{1F642}b".chars().collect();
        assert_eq!(utf16_advance(&chars, 0, 1), Some(1));
        assert_eq!(utf16_advance(&chars, 1, 2), Some(2));
        assert_eq!(utf16_advance(&chars, 0, 3), Some(2));
        assert_eq!(utf16_advance(&chars, 1, 1), None);
        assert_eq!(utf16_advance(&chars, 0, 10), None);
    }
}
