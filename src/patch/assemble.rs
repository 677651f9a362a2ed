//! Build a patch list from source/destination texts or a pre-computed
//! edit script.
//!
//! Grounded on the same walk-the-script-with-two-cursors shape
//! `diff::core`'s line-mode re-diff loop already uses, applied here to
//! carve an edit script into context-padded hunks.

use super::types::{Patch, PatchList};
use crate::diff::{self, Diff, Op};
use crate::options::Options;
use crate::strings::has_ambiguous_occurrence;

fn utf16_len_chars(chars: &[char]) -> usize {
    chars.iter().map(|c| c.len_utf16()).sum()
}

/// Build patches from the diff between `text1` and `text2`.
///
/// Runs the diff core with line-mode checking enabled, then cleans it up
/// with the semantic and efficiency passes when the script has more than
/// two entries (a trivial script isn't worth spending cleanup time on).
pub fn from_texts(text1: &str, text2: &str, opts: &Options) -> PatchList {
    let mut diffs = diff::main(text1, text2, opts);
    if diffs.len() > 2 {
        diff::cleanup_semantic(&mut diffs);
        diff::cleanup_efficiency(&mut diffs, opts);
    }
    from_text_and_script(text1, &diffs, opts)
}

/// Build patches directly from a pre-computed edit script, reconstructing
/// `text1` from its non-INSERT payloads.
pub fn from_script(diffs: &Diff, opts: &Options) -> PatchList {
    let text1 = diff::text1(diffs);
    from_text_and_script(&text1, diffs, opts)
}

/// Build patches from `text1` and a pre-computed edit script taken against
/// it. This is the shape the other two constructors funnel into.
pub fn from_text_and_script(text1: &str, diffs: &Diff, opts: &Options) -> PatchList {
    if diffs.is_empty() {
        return Vec::new();
    }

    let mut patches: PatchList = Vec::new();
    let mut patch = Patch::new();
    let mut char_count1 = 0usize;
    let mut char_count2 = 0usize;
    let mut unit_count1 = 0usize;
    let mut unit_count2 = 0usize;
    let mut prepatch_text: Vec<char> = text1.chars().collect();
    let mut postpatch_text: Vec<char> = prepatch_text.clone();

    for (idx, (op, text)) in diffs.iter().enumerate() {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let units = utf16_len_chars(&chars);

        if patch.diffs.is_empty() && *op != Op::Equal {
            patch.start1 = char_count1;
            patch.start2 = char_count2;
            patch.start1_u16 = unit_count1;
            patch.start2_u16 = unit_count2;
        }

        match op {
            Op::Insert => {
                patch.diffs.push((*op, text.clone()));
                patch.length2 += len;
                postpatch_text.splice(char_count2..char_count2, chars.iter().copied());
            }
            Op::Delete => {
                patch.length1 += len;
                patch.diffs.push((*op, text.clone()));
                postpatch_text.splice(char_count2..char_count2 + len, std::iter::empty());
            }
            Op::Equal => {
                let margin = 2 * opts.patch_margin as usize;
                if len <= margin && !patch.diffs.is_empty() && idx + 1 != diffs.len() {
                    patch.diffs.push((*op, text.clone()));
                    patch.length1 += len;
                    patch.length2 += len;
                } else if len >= margin && !patch.diffs.is_empty() {
                    add_context(&mut patch, &prepatch_text, opts);
                    patches.push(std::mem::replace(&mut patch, Patch::new()));
                    prepatch_text = postpatch_text.clone();
                    char_count1 = char_count2;
                    unit_count1 = unit_count2;
                }
            }
        }

        if *op != Op::Insert {
            char_count1 += len;
            unit_count1 += units;
        }
        if *op != Op::Delete {
            char_count2 += len;
            unit_count2 += units;
        }
    }

    if !patch.diffs.is_empty() {
        add_context(&mut patch, &prepatch_text, opts);
        patches.push(patch);
    }

    patches
}

/// Widen a hunk's boundary with EQUAL context until the pattern it anchors
/// on is unambiguous in `text` (or `match_max_bits` caps further growth),
/// then roll `start1`/`start2` back to cover the added prefix.
fn add_context(patch: &mut Patch, text: &[char], opts: &Options) {
    if text.is_empty() {
        return;
    }

    let slice_to_string = |chars: &[char]| -> String { chars.iter().collect() };
    let mut padding = 0usize;
    let max_pattern_len = (opts.match_max_bits as usize).saturating_sub(2 * opts.patch_margin as usize);

    let pattern_at = |padding: usize| -> (usize, usize) {
        let lo = patch.start2.saturating_sub(padding);
        let hi = (patch.start2 + patch.length1 + padding).min(text.len());
        (lo, hi)
    };

    let (mut lo, mut hi) = pattern_at(0);
    let mut pattern = &text[lo..hi];

    while has_ambiguous_occurrence(pattern, text) && pattern.len() < max_pattern_len {
        padding += opts.patch_margin as usize;
        let (new_lo, new_hi) = pattern_at(padding);
        lo = new_lo;
        hi = new_hi;
        pattern = &text[lo..hi];
    }
    padding += opts.patch_margin as usize;

    let prefix_start = patch.start2.saturating_sub(padding);
    let prefix = &text[prefix_start..patch.start2.min(text.len())];
    if !prefix.is_empty() {
        patch
            .diffs
            .insert(0, (Op::Equal, slice_to_string(prefix)));
    }

    let suffix_start = (patch.start2 + patch.length1).min(text.len());
    let suffix_end = (patch.start2 + patch.length1 + padding).min(text.len());
    let suffix = if suffix_start < suffix_end {
        &text[suffix_start..suffix_end]
    } else {
        &text[0..0]
    };
    if !suffix.is_empty() {
        patch.diffs.push((Op::Equal, slice_to_string(suffix)));
    }

    patch.start1_u16 = patch.start1_u16.saturating_sub(utf16_len_chars(prefix));
    patch.start2_u16 = patch.start2_u16.saturating_sub(utf16_len_chars(prefix));
    patch.start1 = patch.start1.saturating_sub(prefix.len());
    patch.start2 = patch.start2.saturating_sub(prefix.len());
    patch.length1 += prefix.len() + suffix.len();
    patch.length2 += prefix.len() + suffix.len();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_single_hunk_for_small_edit() {
        let opts = Options::default();
        let patches = from_texts("The quick brown fox.", "The slow brown fox.", &opts);
        assert_eq!(patches.len(), 1);
        assert!(patches[0].length1 > 0);
    }

    #[test]
    fn identical_texts_produce_no_patches() {
        let opts = Options::default();
        let patches = from_texts("same text", "same text", &opts);
        assert!(patches.is_empty());
    }

    #[test]
    fn widely_separated_edits_produce_multiple_hunks() {
        let opts = Options::default();
        let text1 = format!("{}edit-one{}edit-two{}", "x".repeat(50), "y".repeat(50), "z".repeat(50));
        let text2 = format!("{}EDIT-ONE{}EDIT-TWO{}", "x".repeat(50), "y".repeat(50), "z".repeat(50));
        let patches = from_texts(&text1, &text2, &opts);
        assert_eq!(patches.len(), 2);
    }
}
