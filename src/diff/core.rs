//! Edit-script production: speedup shortcuts, half-match decomposition,
//! line-mode collapse, and the Myers O(ND) bisection that anchors everything
//! else.
//!
//! Mirrors the core of `packages/json-joy/src/util/diff/str.ts`'s `diff`
//! function, extended with the half-match heuristic, a deadline, and
//! line-mode, none of which that TypeScript source's Rust port carried over.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::cleanup::cleanup_merge;
use super::{normalize, Diff, Op};
use crate::options::Options;
use crate::strings::{chars_to_string, common_prefix_chars, common_suffix_chars, find_char_slice};

/// Compute the diff between `text1` and `text2` with line-mode collapse
/// enabled and the deadline derived from `opts.diff_timeout`.
///
/// This is the `checklines=true` entry point; see [`main_checklines`] to
/// control it explicitly (used internally by patch application, which runs
/// with `checklines=false`).
pub fn main(text1: &str, text2: &str, opts: &Options) -> Diff {
    main_checklines(text1, text2, opts, true)
}

/// Compute the diff between `text1` and `text2`.
///
/// `checklines` enables the line-mode fast path for inputs over 100 chars;
/// callers that need a literally minimal character-level script (patch
/// application's bridging diff) pass `false`.
pub fn main_checklines(text1: &str, text2: &str, opts: &Options, checklines: bool) -> Diff {
    let deadline = if opts.diff_timeout <= 0.0 {
        None
    } else {
        Some(Instant::now() + Duration::from_secs_f64(opts.diff_timeout))
    };
    let script = diff_main(text1, text2, checklines, deadline, opts);
    let mut script = script;
    cleanup_merge(&mut script);
    script
}

fn diff_main(
    text1: &str,
    text2: &str,
    checklines: bool,
    deadline: Option<Instant>,
    opts: &Options,
) -> Diff {
    if text1 == text2 {
        return if text1.is_empty() {
            vec![]
        } else {
            vec![(Op::Equal, text1.to_string())]
        };
    }

    let c1: Vec<char> = text1.chars().collect();
    let c2: Vec<char> = text2.chars().collect();

    let prefix_len = common_prefix_chars(&c1, &c2);
    let prefix = chars_to_string(&c1[..prefix_len]);
    let mid1 = &c1[prefix_len..];
    let mid2 = &c2[prefix_len..];

    let suffix_len = common_suffix_chars(mid1, mid2);
    let suffix = if suffix_len > 0 {
        chars_to_string(&mid1[mid1.len() - suffix_len..])
    } else {
        String::new()
    };
    let mid1 = &mid1[..mid1.len() - suffix_len];
    let mid2 = &mid2[..mid2.len() - suffix_len];

    let mut script = compute(mid1, mid2, checklines, deadline, opts);
    if !prefix.is_empty() {
        script.insert(0, (Op::Equal, prefix));
    }
    if !suffix.is_empty() {
        script.push((Op::Equal, suffix));
    }
    script
}

fn compute(
    c1: &[char],
    c2: &[char],
    checklines: bool,
    deadline: Option<Instant>,
    opts: &Options,
) -> Diff {
    if c1.is_empty() {
        return if c2.is_empty() {
            vec![]
        } else {
            vec![(Op::Insert, chars_to_string(c2))]
        };
    }
    if c2.is_empty() {
        return vec![(Op::Delete, chars_to_string(c1))];
    }

    let (long, short, long_is_src) = if c1.len() > c2.len() {
        (c1, c2, true)
    } else {
        (c2, c1, false)
    };
    if let Some(idx) = find_char_slice(long, short) {
        let short_str = chars_to_string(short);
        let start_str = chars_to_string(&long[..idx]);
        let end_str = chars_to_string(&long[idx + short.len()..]);
        let outer_op = if long_is_src { Op::Delete } else { Op::Insert };
        let mut script = vec![];
        if !start_str.is_empty() {
            script.push((outer_op, start_str));
        }
        if !short_str.is_empty() {
            script.push((Op::Equal, short_str));
        }
        if !end_str.is_empty() {
            script.push((outer_op, end_str));
        }
        return script;
    }

    if short.len() == 1 {
        return vec![
            (Op::Delete, chars_to_string(c1)),
            (Op::Insert, chars_to_string(c2)),
        ];
    }

    if let Some(hm) = half_match(c1, c2, opts) {
        let mut script = diff_main(&hm.text1_a, &hm.text2_a, checklines, deadline, opts);
        script.push((Op::Equal, hm.common));
        script.extend(diff_main(&hm.text1_b, &hm.text2_b, checklines, deadline, opts));
        return script;
    }

    if checklines && c1.len() > 100 && c2.len() > 100 {
        return line_mode(c1, c2, deadline, opts);
    }

    bisect(c1, c2, deadline, opts)
}

// ── Half-match ──────────────────────────────────────────────────────────

struct HalfMatch {
    text1_a: String,
    text1_b: String,
    text2_a: String,
    text2_b: String,
    common: String,
}

/// Look for a substring common to both inputs that is at least half the
/// length of the longer input; if found, split both inputs around it.
/// Disabled when `diff_timeout <= 0` — an unlimited time budget means the
/// caller wants a minimal diff, and half-match trades minimality for speed.
fn half_match(c1: &[char], c2: &[char], opts: &Options) -> Option<HalfMatch> {
    if opts.diff_timeout <= 0.0 {
        return None;
    }
    let (long, short, long_is_src) = if c1.len() > c2.len() {
        (c1, c2, true)
    } else {
        (c2, c1, false)
    };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    let hm1 = half_match_seed(long, short, long.len().div_ceil(4));
    let hm2 = half_match_seed(long, short, long.len().div_ceil(2));

    let best = match (hm1, hm2) {
        (None, None) => return None,
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (Some(a), Some(b)) => {
            if a.4.len() > b.4.len() {
                a
            } else {
                b
            }
        }
    };

    let (long_a, long_b, short_a, short_b, common) = best;
    if long_is_src {
        Some(HalfMatch {
            text1_a: chars_to_string(&long_a),
            text1_b: chars_to_string(&long_b),
            text2_a: chars_to_string(&short_a),
            text2_b: chars_to_string(&short_b),
            common: chars_to_string(&common),
        })
    } else {
        Some(HalfMatch {
            text1_a: chars_to_string(&short_a),
            text1_b: chars_to_string(&short_b),
            text2_a: chars_to_string(&long_a),
            text2_b: chars_to_string(&long_b),
            common: chars_to_string(&common),
        })
    }
}

type SeedResult = (Vec<char>, Vec<char>, Vec<char>, Vec<char>, Vec<char>);

/// Seed a half-match candidate at `long[seed..seed+|short|/4... ]`, extended
/// by common prefix/suffix against `short`.
fn half_match_seed(long: &[char], short: &[char], seed_start: usize) -> Option<SeedResult> {
    let seed_len = long.len() / 4;
    if seed_start + seed_len > long.len() {
        return None;
    }
    let seed = &long[seed_start..seed_start + seed_len];

    let mut best_common: Vec<char> = vec![];
    let mut best_long_a: Vec<char> = vec![];
    let mut best_long_b: Vec<char> = vec![];
    let mut best_short_a: Vec<char> = vec![];
    let mut best_short_b: Vec<char> = vec![];

    let mut from = 0usize;
    while let Some(found_rel) = find_char_slice(&short[from..], seed) {
        let found = from + found_rel;
        let prefix_len = common_prefix_chars(&long[seed_start..], &short[found..]);
        let suffix_len = common_suffix_chars(&long[..seed_start], &short[..found]);
        if best_common.len() < suffix_len + prefix_len {
            best_common = short[found - suffix_len..found + prefix_len].to_vec();
            best_long_a = long[..seed_start - suffix_len].to_vec();
            best_long_b = long[seed_start + prefix_len..].to_vec();
            best_short_a = short[..found - suffix_len].to_vec();
            best_short_b = short[found + prefix_len..].to_vec();
        }
        from = found + 1;
        if from >= short.len() {
            break;
        }
    }

    if best_common.len() * 2 >= long.len() {
        Some((
            best_long_a,
            best_long_b,
            best_short_a,
            best_short_b,
            best_common,
        ))
    } else {
        None
    }
}

// ── Line mode ───────────────────────────────────────────────────────────

/// Hash each line to a single `char` (0 and 65535 reserved/bail value),
/// diff the hashed strings, rehydrate the result, then re-diff each
/// INSERT/DELETE block character-wise for a minimal-looking but cheap
/// result on large, mostly-line-aligned inputs.
fn line_mode(c1: &[char], c2: &[char], deadline: Option<Instant>, opts: &Options) -> Diff {
    let text1 = chars_to_string(c1);
    let text2 = chars_to_string(c2);

    let (hash1, hash2, lines) = lines_to_chars(&text1, &text2);
    let mut script = compute(
        &hash1.chars().collect::<Vec<_>>(),
        &hash2.chars().collect::<Vec<_>>(),
        false,
        deadline,
        opts,
    );
    chars_to_lines(&mut script, &lines);
    cleanup_merge(&mut script);

    // Re-diff each adjacent delete/insert block character-wise; the
    // line-hashed diff is fast but not minimal at the boundary.
    script.push((Op::Equal, String::new()));
    let mut pointer = 0usize;
    let mut count_delete = 0usize;
    let mut count_insert = 0usize;
    let mut text_delete = String::new();
    let mut text_insert = String::new();
    while pointer < script.len() {
        match script[pointer].0 {
            Op::Insert => {
                count_insert += 1;
                text_insert.push_str(&script[pointer].1);
            }
            Op::Delete => {
                count_delete += 1;
                text_delete.push_str(&script[pointer].1);
            }
            Op::Equal => {
                if count_delete >= 1 && count_insert >= 1 {
                    let start = pointer - count_delete - count_insert;
                    let sub_script = diff_main(&text_delete, &text_insert, false, deadline, opts);
                    let sub_len = sub_script.len();
                    script.splice(start..pointer, sub_script);
                    pointer = start + sub_len;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
        pointer += 1;
    }
    script.pop();
    script
}

/// Split `text1`/`text2` into lines (including trailing `\n`) and replace
/// each distinct line with a single synthetic `char` so the existing
/// char-level diff machinery can be reused at line granularity. Bails out
/// by folding the remaining text into one last pseudo-line at 65535
/// distinct lines (`char` 0 is reserved as a sentinel and never assigned).
fn lines_to_chars(text1: &str, text2: &str) -> (String, String, Vec<String>) {
    let mut line_array: Vec<String> = vec![String::new()]; // index 0 reserved, never assigned
    let mut line_hash: HashMap<String, u32> = HashMap::new();
    let max_lines = 65535usize;

    let mut encode = |text: &str| -> String {
        let c: Vec<char> = text.chars().collect();
        let mut chars = String::new();
        let mut line_start = 0usize;
        if c.is_empty() {
            return chars;
        }
        loop {
            let mut line_end = match c[line_start..].iter().position(|&ch| ch == '\n') {
                Some(rel) => line_start + rel,
                None => c.len() - 1,
            };
            let mut line: String = c[line_start..=line_end.min(c.len() - 1)].iter().collect();

            if let Some(&idx) = line_hash.get(&line) {
                chars.push(line_char(idx));
            } else {
                if line_array.len() == max_lines {
                    line = c[line_start..].iter().collect();
                    line_end = c.len();
                }
                let idx = line_array.len() as u32;
                chars.push(line_char(idx));
                line_hash.insert(line.clone(), idx);
                line_array.push(line);
            }
            line_start = line_end + 1;
            if line_start >= c.len() {
                break;
            }
        }
        chars
    };

    let chars1 = encode(text1);
    let chars2 = encode(text2);
    (chars1, chars2, line_array)
}

/// Map a line index to a `char`, skipping the UTF-16 surrogate range
/// (`0xD800..=0xDFFF`): unlike the original's native 16-bit code units,
/// Rust's `char` cannot represent a lone surrogate, so indices that would
/// fall in that gap are shifted past it. The mapping stays a bijection
/// over `1..max_lines`, which is all `lines_to_chars` ever needs.
fn line_char(idx: u32) -> char {
    const SURROGATE_START: u32 = 0xD800;
    const SURROGATE_LEN: u32 = 0xE000 - 0xD800;
    let mapped = if idx < SURROGATE_START {
        idx
    } else {
        idx + SURROGATE_LEN
    };
    char::from_u32(mapped).expect("line index mapped outside the valid char range")
}

fn chars_to_lines(script: &mut Diff, line_array: &[String]) {
    for (_, text) in script.iter_mut() {
        let mut rebuilt = String::with_capacity(text.len());
        for ch in text.chars() {
            let idx = ch as usize;
            if let Some(line) = line_array.get(idx) {
                rebuilt.push_str(line);
            }
        }
        *text = rebuilt;
    }
}

// ── Myers bisect ────────────────────────────────────────────────────────

/// Bidirectional O(ND) wavefront bisection. Returns the trivial
/// `[DELETE c1, INSERT c2]` if the deadline elapses before a split point is
/// found.
fn bisect(c1: &[char], c2: &[char], deadline: Option<Instant>, opts: &Options) -> Diff {
    let n1 = c1.len();
    let n2 = c2.len();
    let max_d = (n1 + n2).div_ceil(2) + 1;
    let v_offset = max_d;
    let v_length = 2 * max_d;

    let mut v1: Vec<i64> = vec![-1; v_length];
    let mut v2: Vec<i64> = vec![-1; v_length];
    v1[v_offset + 1] = 0;
    v2[v_offset + 1] = 0;

    let delta = n1 as i64 - n2 as i64;
    let front = delta % 2 != 0;

    let mut k1start = 0i64;
    let mut k1end = 0i64;
    let mut k2start = 0i64;
    let mut k2end = 0i64;

    for d in 0..max_d as i64 {
        if let Some(dl) = deadline {
            if Instant::now() >= dl {
                break;
            }
        }

        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset as i64 + k1) as usize;
            let mut x1: i64 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n1 as i64 && y1 < n2 as i64 && c1[x1 as usize] == c2[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n1 as i64 {
                k1end += 2;
            } else if y1 > n2 as i64 {
                k1start += 2;
            } else if front {
                let k2_offset_signed = v_offset as i64 + delta - k1;
                if (0..v_length as i64).contains(&k2_offset_signed) {
                    let k2_offset = k2_offset_signed as usize;
                    if v2[k2_offset] != -1 && x1 >= n1 as i64 - v2[k2_offset] {
                        return bisect_split(c1, c2, x1 as usize, y1 as usize, deadline, opts);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset as i64 + k2) as usize;
            let mut x2: i64 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n1 as i64
                && y2 < n2 as i64
                && c1[n1 - 1 - x2 as usize] == c2[n2 - 1 - y2 as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n1 as i64 {
                k2end += 2;
            } else if y2 > n2 as i64 {
                k2start += 2;
            } else if !front {
                let k1_offset_signed = v_offset as i64 + delta - k2;
                if (0..v_length as i64).contains(&k1_offset_signed) {
                    let k1_offset = k1_offset_signed as usize;
                    let x1 = v1[k1_offset];
                    if x1 != -1 {
                        let y1 = v_offset as i64 + x1 - k1_offset as i64;
                        let x2_real = n1 as i64 - x2;
                        if x1 >= x2_real {
                            return bisect_split(c1, c2, x1 as usize, y1 as usize, deadline, opts);
                        }
                    }
                }
            }
            k2 += 2;
        }
    }

    vec![
        (Op::Delete, chars_to_string(c1)),
        (Op::Insert, chars_to_string(c2)),
    ]
}

fn bisect_split(
    c1: &[char],
    c2: &[char],
    x: usize,
    y: usize,
    deadline: Option<Instant>,
    opts: &Options,
) -> Diff {
    let src_a: String = c1[..x].iter().collect();
    let dst_a: String = c2[..y].iter().collect();
    let src_b: String = c1[x..].iter().collect();
    let dst_b: String = c2[y..].iter().collect();
    let mut result = diff_main(&src_a, &dst_a, false, deadline, opts);
    result.extend(diff_main(&src_b, &dst_b, false, deadline, opts));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{text1, text2};

    #[test]
    fn identical_strings() {
        let opts = Options::default();
        let script = main("hello", "hello", &opts);
        assert_eq!(script, vec![(Op::Equal, "hello".to_string())]);
    }

    #[test]
    fn empty_source() {
        let opts = Options::default();
        let script = main("", "hello", &opts);
        assert_eq!(script, vec![(Op::Insert, "hello".to_string())]);
    }

    #[test]
    fn empty_destination() {
        let opts = Options::default();
        let script = main("hello", "", &opts);
        assert_eq!(script, vec![(Op::Delete, "hello".to_string())]);
    }

    #[test]
    fn round_trip_laws_hold() {
        let opts = Options::default();
        let a = "The quick brown fox jumps over the lazy dog.";
        let b = "That quick brown fox jumped over a lazy dog.";
        let script = main(a, b, &opts);
        assert_eq!(text1(&script), a);
        assert_eq!(text2(&script), b);
    }

    #[test]
    fn bisect_used_for_non_trivial_diff() {
        let opts = Options::default();
        let script = main("the quick brown fox", "the slow green fox", &opts);
        assert_eq!(text1(&script), "the quick brown fox");
        assert_eq!(text2(&script), "the slow green fox");
    }

    #[test]
    fn half_match_disabled_when_unlimited() {
        let opts = Options::unlimited();
        let a = "1234567890123456789012345678901234567890abcdefghij";
        let b = "abcdefghij1234567890123456789012345678901234567890";
        let script = main(a, b, &opts);
        assert_eq!(text1(&script), a);
        assert_eq!(text2(&script), b);
    }

    #[test]
    fn line_mode_on_large_inputs() {
        let opts = Options::default();
        let a = "line one\n".repeat(60) + "tail a\n";
        let b = "line one\n".repeat(60) + "tail b\n";
        let script = main(&a, &b, &opts);
        assert_eq!(text1(&script), a);
        assert_eq!(text2(&script), b);
    }
}
