//! Apply a patch list against a text, relocating hunks via the match
//! engine when the text has drifted since the patch was made.
//!
//! Grounded on the same deadline-free, cursor-tracking style `diff::core`'s
//! line-mode re-diff loop uses, generalized to the patch-application
//! bookkeeping (rolling delta, padding, oversized-hunk splitting).

use super::types::{Patch, PatchList};
use crate::diff::{self, Op};
use crate::match_engine;
use crate::options::Options;
use crate::strings::utf16_len;

/// Apply `patches` against `text`, returning the patched text and one
/// success flag per hunk (in order).
///
/// Each hunk is relocated with the fuzzy matcher starting from its
/// recorded position plus the accumulated drift (`delta`) of prior hunks.
/// A hunk whose content has changed too much once relocated — judged by
/// `patch_delete_threshold` against the bridging diff's Levenshtein
/// distance — is rejected rather than corrupting the text.
pub fn apply(patches: &PatchList, text: &str, opts: &Options) -> (String, Vec<bool>) {
    if patches.is_empty() {
        return (text.to_string(), Vec::new());
    }

    let mut patches = patches.to_vec();
    let null_padding = add_padding(&mut patches, opts);
    let mut chars: Vec<char> = null_padding
        .chars()
        .chain(text.chars())
        .chain(null_padding.chars())
        .collect();

    split_max(&mut patches, opts);

    let mut delta: i64 = 0;
    let mut results = Vec::with_capacity(patches.len());

    for patch in &patches {
        let expected_loc = (patch.start2 as i64 + delta).max(0) as usize;
        let text1: Vec<char> = diff::text1(&patch.diffs).chars().collect();
        let text1_str: String = text1.iter().collect();

        let mut start_loc: Option<usize>;
        let mut end_loc: Option<usize> = None;

        if text1.len() > opts.match_max_bits as usize {
            let head: String = text1[..opts.match_max_bits as usize].iter().collect();
            start_loc = match_engine::locate(&chars_to_string(&chars), &head, expected_loc, opts)
                .unwrap_or(None);
            if let Some(s) = start_loc {
                let tail_start = text1.len() - opts.match_max_bits as usize;
                let tail: String = text1[tail_start..].iter().collect();
                let tail_expected = expected_loc + tail_start;
                end_loc = match_engine::locate(&chars_to_string(&chars), &tail, tail_expected, opts)
                    .unwrap_or(None);
                if end_loc.is_none() || s >= end_loc.unwrap() {
                    start_loc = None;
                }
            }
        } else {
            start_loc = match_engine::locate(&chars_to_string(&chars), &text1_str, expected_loc, opts)
                .unwrap_or(None);
        }

        match start_loc {
            None => {
                results.push(false);
                delta -= patch.length2 as i64 - patch.length1 as i64;
            }
            Some(start_loc) => {
                delta = start_loc as i64 - expected_loc as i64;
                let text2: Vec<char> = match end_loc {
                    None => {
                        let end = (start_loc + text1.len()).min(chars.len());
                        chars[start_loc..end].to_vec()
                    }
                    Some(end_loc) => {
                        let end = (end_loc + opts.match_max_bits as usize).min(chars.len());
                        chars[start_loc..end].to_vec()
                    }
                };

                if text1 == text2 {
                    let replacement: Vec<char> = diff::text2(&patch.diffs).chars().collect();
                    let end = (start_loc + text1.len()).min(chars.len());
                    chars.splice(start_loc..end, replacement);
                    results.push(true);
                } else {
                    let text2_str: String = text2.iter().collect();
                    let mut bridging = diff::main_checklines(&text1_str, &text2_str, opts, false);
                    if text1.len() > opts.match_max_bits as usize
                        && diff::levenshtein(&bridging) as f64 / text1.len() as f64
                            > opts.patch_delete_threshold
                    {
                        results.push(false);
                    } else {
                        diff::cleanup_semantic_lossless(&mut bridging);
                        let mut index1 = 0usize;
                        let mut index2 = 0usize;
                        for (op, mod_text) in &patch.diffs {
                            let mod_len = mod_text.chars().count();
                            if *op != Op::Equal {
                                index2 = diff::x_index(&bridging, index1);
                            }
                            match op {
                                Op::Insert => {
                                    let insert: Vec<char> = mod_text.chars().collect();
                                    let at = (start_loc + index2).min(chars.len());
                                    chars.splice(at..at, insert);
                                }
                                Op::Delete => {
                                    let del_end_src = diff::x_index(&bridging, index1 + mod_len);
                                    let from = (start_loc + index2).min(chars.len());
                                    let to = (start_loc + del_end_src).min(chars.len());
                                    if from < to {
                                        chars.splice(from..to, std::iter::empty());
                                    }
                                }
                                Op::Equal => {}
                            }
                            if *op != Op::Delete {
                                index1 += mod_len;
                            }
                        }
                        results.push(true);
                    }
                }
            }
        }
    }

    let pad_len = null_padding.chars().count();
    let end = chars.len().saturating_sub(pad_len);
    let patched: String = chars[pad_len.min(end)..end].iter().collect();
    (patched, results)
}

fn chars_to_string(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Add a `patch_margin`-long run of reserved control chars (`\u{1}..`)
/// around the text before relocating hunks, so a hunk anchored at the very
/// start or end of the text still has EQUAL context to match against.
fn add_padding(patches: &mut PatchList, opts: &Options) -> String {
    let margin = opts.patch_margin as usize;
    let null_padding: String = (1..=margin as u32).filter_map(char::from_u32).collect();

    for patch in patches.iter_mut() {
        patch.start1 += margin;
        patch.start2 += margin;
        patch.start1_u16 += margin;
        patch.start2_u16 += margin;
    }

    if let Some(first) = patches.first_mut() {
        match first.diffs.first_mut() {
            Some((Op::Equal, text)) if text.chars().count() < margin => {
                let existing = text.chars().count();
                let extra = margin - existing;
                let prefix: String = null_padding.chars().skip(existing).collect();
                *text = format!("{prefix}{text}");
                first.start1 -= extra;
                first.start2 -= extra;
                first.start1_u16 -= extra;
                first.start2_u16 -= extra;
                first.length1 += extra;
                first.length2 += extra;
            }
            Some((Op::Equal, _)) => {}
            _ => {
                first.diffs.insert(0, (Op::Equal, null_padding.clone()));
                first.start1 -= margin;
                first.start2 -= margin;
                first.start1_u16 -= margin;
                first.start2_u16 -= margin;
                first.length1 += margin;
                first.length2 += margin;
            }
        }
    }

    if let Some(last) = patches.last_mut() {
        match last.diffs.last_mut() {
            Some((Op::Equal, text)) if text.chars().count() < margin => {
                let existing = text.chars().count();
                let extra = margin - existing;
                let suffix: String = null_padding.chars().take(extra).collect();
                text.push_str(&suffix);
                last.length1 += extra;
                last.length2 += extra;
            }
            Some((Op::Equal, _)) => {}
            _ => {
                last.diffs.push((Op::Equal, null_padding.clone()));
                last.length1 += margin;
                last.length2 += margin;
            }
        }
    }

    null_padding
}

/// Split any hunk whose `length1` exceeds `match_max_bits` into several
/// smaller hunks chained by a rolling context, so the matcher never has to
/// locate a pattern longer than it can represent as a Bitap bitmask.
fn split_max(patches: &mut PatchList, opts: &Options) {
    let patch_size = opts.match_max_bits as usize;
    let margin = opts.patch_margin as usize;
    let mut x = 0usize;

    while x < patches.len() {
        if patches[x].length1 <= patch_size {
            x += 1;
            continue;
        }
        let bigpatch = patches.remove(x);
        let mut start1 = bigpatch.start1;
        let mut start2 = bigpatch.start2;
        let mut start1_u16 = bigpatch.start1_u16;
        let mut start2_u16 = bigpatch.start2_u16;
        let mut remaining = bigpatch.diffs;
        let mut precontext = String::new();
        let mut insert_at = x;

        while !remaining.is_empty() {
            let mut patch = Patch::new();
            let mut empty = true;
            let precontext_units = utf16_len(&precontext);
            patch.start1 = start1.saturating_sub(precontext.chars().count());
            patch.start2 = start2.saturating_sub(precontext.chars().count());
            patch.start1_u16 = start1_u16.saturating_sub(precontext_units);
            patch.start2_u16 = start2_u16.saturating_sub(precontext_units);
            if !precontext.is_empty() {
                let len = precontext.chars().count();
                patch.length1 = len;
                patch.length2 = len;
                patch.diffs.push((Op::Equal, precontext.clone()));
            }

            while !remaining.is_empty() && patch.length1 < patch_size.saturating_sub(margin) {
                let (diff_type, diff_text) = remaining[0].clone();
                let diff_len = diff_text.chars().count();
                let diff_units = utf16_len(&diff_text);

                if diff_type == Op::Insert {
                    patch.length2 += diff_len;
                    start2 += diff_len;
                    start2_u16 += diff_units;
                    patch.diffs.push(remaining.remove(0));
                    empty = false;
                } else if diff_type == Op::Delete
                    && patch.diffs.len() == 1
                    && patch.diffs[0].0 == Op::Equal
                    && diff_len > 2 * patch_size
                {
                    patch.length1 += diff_len;
                    start1 += diff_len;
                    start1_u16 += diff_units;
                    empty = false;
                    patch.diffs.push((diff_type, diff_text));
                    remaining.remove(0);
                } else {
                    let take = patch_size.saturating_sub(patch.length1).saturating_sub(margin);
                    let take = take.min(diff_len);
                    let taken: String = diff_text.chars().take(take).collect();
                    let taken_len = taken.chars().count();
                    let taken_units = utf16_len(&taken);
                    patch.length1 += taken_len;
                    start1 += taken_len;
                    start1_u16 += taken_units;
                    if diff_type == Op::Equal {
                        patch.length2 += taken_len;
                        start2 += taken_len;
                        start2_u16 += taken_units;
                    } else {
                        empty = false;
                    }
                    patch.diffs.push((diff_type, taken.clone()));
                    if taken_len == diff_len {
                        remaining.remove(0);
                    } else {
                        let rest: String = diff_text.chars().skip(taken_len).collect();
                        remaining[0] = (diff_type, rest);
                    }
                }
            }

            precontext = diff::text2(&patch.diffs);
            let precontext_len = precontext.chars().count();
            if precontext_len > margin {
                precontext = precontext.chars().skip(precontext_len - margin).collect();
            }

            let postcontext_full = diff::text1(&remaining);
            let postcontext: String = postcontext_full.chars().take(margin).collect();
            if !postcontext.is_empty() {
                let post_len = postcontext.chars().count();
                patch.length1 += post_len;
                patch.length2 += post_len;
                match patch.diffs.last_mut() {
                    Some((Op::Equal, text)) => text.push_str(&postcontext),
                    _ => patch.diffs.push((Op::Equal, postcontext)),
                }
            }

            if !empty {
                patches.insert(insert_at, patch);
                insert_at += 1;
                x += 1;
            }
        }
    }
}
