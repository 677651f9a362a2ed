//! Cleanup passes that rewrite an edit script without changing what it
//! encodes: merge, semantic, semantic-lossless, and efficiency.
//!
//! Mirrors `packages/json-joy/src/util/diff/str.ts`'s `cleanupMerge` and
//! `packages/json-joy/src/util/diff/str-utils.ts`'s `cleanupPatch`
//! (semantic + lossless), extended with an efficiency pass that has no
//! existing Rust counterpart to port from.

use super::{Diff, Op};
use crate::options::Options;
use crate::strings::{common_overlap, common_prefix_chars, common_suffix_chars};

/// Merge adjacent same-op entries, factor common pre/suffixes of coincident
/// INSERT+DELETE pairs into the surrounding EQUAL entries, drop empty
/// entries, then slide single edits sideways when that eliminates an
/// EQUAL. Re-runs until a fixed point.
pub fn cleanup_merge(diff: &mut Diff) {
    diff.push((Op::Equal, String::new()));
    let mut pointer = 0usize;
    let mut del_cnt = 0usize;
    let mut ins_cnt = 0usize;
    let mut del_txt = String::new();
    let mut ins_txt = String::new();

    while pointer < diff.len() {
        if pointer < diff.len() - 1 && diff[pointer].1.is_empty() {
            diff.remove(pointer);
            continue;
        }

        match diff[pointer].0 {
            Op::Insert => {
                ins_cnt += 1;
                let txt = diff[pointer].1.clone();
                ins_txt.push_str(&txt);
                pointer += 1;
            }
            Op::Delete => {
                del_cnt += 1;
                let txt = diff[pointer].1.clone();
                del_txt.push_str(&txt);
                pointer += 1;
            }
            Op::Equal => {
                let prev_eq: Option<usize> = {
                    let p = pointer as i64 - ins_cnt as i64 - del_cnt as i64 - 1;
                    if p >= 0 {
                        Some(p as usize)
                    } else {
                        None
                    }
                };

                if !del_txt.is_empty() || !ins_txt.is_empty() {
                    if !del_txt.is_empty() && !ins_txt.is_empty() {
                        let del_chars: Vec<char> = del_txt.chars().collect();
                        let ins_chars: Vec<char> = ins_txt.chars().collect();
                        let common = common_prefix_chars(&ins_chars, &del_chars);
                        if common > 0 {
                            let prefix: String = ins_chars[..common].iter().collect();
                            if let Some(pq) = prev_eq {
                                diff[pq].1.push_str(&prefix);
                            } else {
                                diff.insert(0, (Op::Equal, prefix));
                                pointer += 1;
                            }
                            ins_txt = ins_chars[common..].iter().collect();
                            del_txt = del_chars[common..].iter().collect();
                        }

                        let del_chars: Vec<char> = del_txt.chars().collect();
                        let ins_chars: Vec<char> = ins_txt.chars().collect();
                        let common = common_suffix_chars(&ins_chars, &del_chars);
                        if common > 0 {
                            let ins_len = ins_chars.len();
                            let suffix: String = ins_chars[ins_len - common..].iter().collect();
                            let cur_txt = diff[pointer].1.clone();
                            diff[pointer].1 = suffix + &cur_txt;
                            ins_txt = ins_chars[..ins_len - common].iter().collect();
                            del_txt = del_chars[..del_chars.len() - common].iter().collect();
                        }
                    }

                    let n = ins_cnt + del_cnt;
                    let start = pointer - n;
                    let del_empty = del_txt.is_empty();
                    let ins_empty = ins_txt.is_empty();

                    if del_empty && ins_empty {
                        diff.splice(start..pointer, []);
                        pointer = start;
                    } else if del_empty {
                        let ins = ins_txt.clone();
                        diff.splice(start..pointer, [(Op::Insert, ins)]);
                        pointer = start + 1;
                    } else if ins_empty {
                        let del = del_txt.clone();
                        diff.splice(start..pointer, [(Op::Delete, del)]);
                        pointer = start + 1;
                    } else {
                        let del = del_txt.clone();
                        let ins = ins_txt.clone();
                        diff.splice(start..pointer, [(Op::Delete, del), (Op::Insert, ins)]);
                        pointer = start + 2;
                    }
                }

                if pointer != 0 && diff[pointer - 1].0 == Op::Equal {
                    let cur_txt = diff[pointer].1.clone();
                    diff[pointer - 1].1.push_str(&cur_txt);
                    diff.remove(pointer);
                } else {
                    pointer += 1;
                }

                ins_cnt = 0;
                del_cnt = 0;
                del_txt.clear();
                ins_txt.clear();
            }
        }
    }

    if diff.last().map(|(_, s)| s.is_empty()) == Some(true) {
        diff.pop();
    }

    let mut changes = false;
    let mut pointer = 1usize;
    while pointer + 1 < diff.len() {
        let prev_type = diff[pointer - 1].0;
        let next_type = diff[pointer + 1].0;
        if prev_type == Op::Equal && next_type == Op::Equal {
            let prev_chars: Vec<char> = diff[pointer - 1].1.chars().collect();
            let cur_chars: Vec<char> = diff[pointer].1.chars().collect();
            let next_chars: Vec<char> = diff[pointer + 1].1.chars().collect();

            if cur_chars.len() >= prev_chars.len()
                && cur_chars[cur_chars.len() - prev_chars.len()..] == prev_chars[..]
            {
                let new_cur: String = prev_chars
                    .iter()
                    .chain(cur_chars[..cur_chars.len() - prev_chars.len()].iter())
                    .collect();
                let new_next: String = prev_chars.iter().chain(next_chars.iter()).collect();
                diff[pointer].1 = new_cur;
                diff[pointer + 1].1 = new_next;
                diff.remove(pointer - 1);
                changes = true;
            } else if cur_chars.len() >= next_chars.len()
                && cur_chars[..next_chars.len()] == next_chars[..]
            {
                let new_prev: String = prev_chars.iter().chain(next_chars.iter()).collect();
                let new_cur: String = cur_chars[next_chars.len()..]
                    .iter()
                    .chain(next_chars.iter())
                    .collect();
                diff[pointer - 1].1 = new_prev;
                diff[pointer].1 = new_cur;
                diff.remove(pointer + 1);
                changes = true;
                pointer += 1;
            } else {
                pointer += 1;
            }
        } else {
            pointer += 1;
        }
    }

    if changes {
        cleanup_merge(diff);
    }
}

/// Eliminate short EQUAL islands whose length is dwarfed by the edits on
/// either side, replacing them with explicit DELETE+INSERT, then factor out
/// cross-edit overlaps between a DELETE and the INSERT immediately
/// following it.
pub fn cleanup_semantic(diff: &mut Diff) {
    let mut changes = false;
    let mut equalities: Vec<i64> = Vec::new();
    let mut last_equality: Option<String> = None;
    let mut pointer: i64 = 0;
    let mut len_ins1 = 0usize;
    let mut len_del1 = 0usize;
    let mut len_ins2 = 0usize;
    let mut len_del2 = 0usize;

    while pointer < diff.len() as i64 {
        let p = pointer as usize;
        if diff[p].0 == Op::Equal {
            equalities.push(pointer);
            len_ins1 = len_ins2;
            len_del1 = len_del2;
            len_ins2 = 0;
            len_del2 = 0;
            last_equality = Some(diff[p].1.clone());
        } else {
            if diff[p].0 == Op::Insert {
                len_ins2 += diff[p].1.chars().count();
            } else {
                len_del2 += diff[p].1.chars().count();
            }

            if let Some(ref le) = last_equality {
                let le_len = le.chars().count();
                if le_len <= len_ins1.max(len_del1) && le_len <= len_ins2.max(len_del2) {
                    let eq_idx = *equalities.last().unwrap() as usize;
                    let le_text = le.clone();
                    diff.insert(eq_idx, (Op::Delete, le_text));
                    diff[eq_idx + 1].0 = Op::Insert;
                    // Throw away the equality we just deleted and the
                    // previous one (it needs to be reevaluated).
                    equalities.pop();
                    equalities.pop();
                    pointer = equalities.last().copied().unwrap_or(-1);
                    len_ins1 = 0;
                    len_del1 = 0;
                    len_ins2 = 0;
                    len_del2 = 0;
                    last_equality = None;
                    changes = true;
                }
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(diff);
        cleanup_semantic(diff);
        return;
    }

    cleanup_semantic_lossless(diff);

    // Find overlaps between a DELETE and the INSERT right after it.
    let mut pointer = 1usize;
    while pointer < diff.len() {
        if diff[pointer - 1].0 == Op::Delete && diff[pointer].0 == Op::Insert {
            let deletion = diff[pointer - 1].1.clone();
            let insertion = diff[pointer].1.clone();
            let del_chars = deletion.chars().count();
            let ins_chars = insertion.chars().count();
            let ov1 = common_overlap(&deletion, &insertion);
            let ov2 = common_overlap(&insertion, &deletion);
            if ov1 >= ov2 {
                if ov1 * 2 >= del_chars || ov1 * 2 >= ins_chars {
                    let eq_str: String = insertion.chars().take(ov1).collect();
                    let del_str: String = deletion.chars().take(del_chars - ov1).collect();
                    let ins_str: String = insertion.chars().skip(ov1).collect();
                    diff[pointer - 1].1 = del_str;
                    diff.insert(pointer, (Op::Equal, eq_str));
                    diff[pointer + 1].1 = ins_str;
                    pointer += 1;
                }
            } else if ov2 * 2 >= del_chars || ov2 * 2 >= ins_chars {
                let eq_str: String = deletion.chars().take(ov2).collect();
                let ins_str: String = insertion.chars().take(ins_chars - ov2).collect();
                let del_str: String = deletion.chars().skip(ov2).collect();
                diff.insert(pointer, (Op::Equal, eq_str));
                diff[pointer - 1].0 = Op::Insert;
                diff[pointer - 1].1 = ins_str;
                diff[pointer + 1].0 = Op::Delete;
                diff[pointer + 1].1 = del_str;
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Score a boundary between `one` and `two` for how good a place it is to
/// break an edit, 0 (mid-word) to 6 (one side empty). Higher wins ties to
/// the trailing position when sliding an edit through surrounding equals.
fn semantic_score(one: &str, two: &str) -> u8 {
    if one.is_empty() || two.is_empty() {
        return 6;
    }
    let char1 = one.chars().last().unwrap();
    let char2 = two.chars().next().unwrap();
    let non_alnum1 = !char1.is_alphanumeric();
    let non_alnum2 = !char2.is_alphanumeric();
    let ws1 = non_alnum1 && char1.is_whitespace();
    let ws2 = non_alnum2 && char2.is_whitespace();
    let lb1 = ws1 && (char1 == '\r' || char1 == '\n');
    let lb2 = ws2 && (char2 == '\r' || char2 == '\n');
    let bl1 = lb1 && (one.ends_with("\n\r\n") || one.ends_with("\n\n"));
    let bl2 = lb2 && (two.starts_with("\r\n\r\n") || two.starts_with("\n\n"));
    if bl1 || bl2 {
        return 5;
    }
    if lb1 || lb2 {
        return 4;
    }
    if non_alnum1 && !ws1 && ws2 {
        return 3;
    }
    if ws1 || ws2 {
        return 2;
    }
    if non_alnum1 || non_alnum2 {
        return 1;
    }
    0
}

/// For each single edit between two EQUALs, slide it through the
/// surrounding equalities and keep the alignment with the best boundary
/// score (ties favor the trailing position).
pub fn cleanup_semantic_lossless(diff: &mut Diff) {
    let mut pointer = 1usize;
    while pointer + 1 < diff.len() {
        let prev_type = diff[pointer - 1].0;
        let next_type = diff[pointer + 1].0;
        if prev_type == Op::Equal && next_type == Op::Equal {
            let mut equality1 = diff[pointer - 1].1.clone();
            let mut edit = diff[pointer].1.clone();
            let mut equality2 = diff[pointer + 1].1.clone();

            let common = crate::strings::common_suffix(&equality1, &edit);
            if common > 0 {
                let e1_chars: Vec<char> = equality1.chars().collect();
                let edit_chars: Vec<char> = edit.chars().collect();
                let common_str: String = edit_chars[edit_chars.len() - common..].iter().collect();
                equality1 = e1_chars[..e1_chars.len() - common].iter().collect();
                edit = common_str.clone()
                    + &edit_chars[..edit_chars.len() - common]
                        .iter()
                        .collect::<String>();
                equality2 = common_str + &equality2;
            }

            let mut best_eq1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_eq2 = equality2.clone();
            let mut best_score =
                semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);

            let mut eq1 = equality1.clone();
            let mut ed = edit.clone();
            let mut eq2 = equality2.clone();

            while !ed.is_empty() && !eq2.is_empty() {
                let ed_chars: Vec<char> = ed.chars().collect();
                let eq2_chars_cur: Vec<char> = eq2.chars().collect();
                if ed_chars[0] != eq2_chars_cur[0] {
                    break;
                }
                let c = ed_chars[0];
                eq1.push(c);
                ed = ed_chars[1..].iter().collect::<String>() + &c.to_string();
                eq2 = eq2_chars_cur[1..].iter().collect();
                let score = semantic_score(&eq1, &ed) + semantic_score(&ed, &eq2);
                if score >= best_score {
                    best_score = score;
                    best_eq1 = eq1.clone();
                    best_edit = ed.clone();
                    best_eq2 = eq2.clone();
                }
            }

            if diff[pointer - 1].1 != best_eq1 {
                if best_eq1.is_empty() {
                    diff.remove(pointer - 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    diff[pointer - 1].1 = best_eq1;
                }
                if let Some(p) = diff.get_mut(pointer) {
                    p.1 = best_edit;
                }
                if pointer + 1 < diff.len() {
                    if best_eq2.is_empty() {
                        diff.remove(pointer + 1);
                        pointer = pointer.saturating_sub(1);
                    } else {
                        diff[pointer + 1].1 = best_eq2;
                    }
                }
            }
        }
        pointer += 1;
    }
}

/// Eliminate short EQUALs surrounded on both sides by edit operations,
/// using `diff_edit_cost` as the fusion budget: an EQUAL shorter than the
/// cost is fused into its neighbors when there are four surrounding edits,
/// or three surrounding edits and the EQUAL is shorter than half the cost.
pub fn cleanup_efficiency(diff: &mut Diff, opts: &Options) {
    let mut changes = false;
    let mut equalities: Vec<i64> = Vec::new();
    let mut last_equality: Option<String> = None;
    let mut pointer: i64 = 0;
    // Booleans for whether there is an insertion or deletion before/after
    // the last equality.
    let mut pre_ins = false;
    let mut pre_del = false;
    let mut post_ins = false;
    let mut post_del = false;
    let edit_cost = opts.diff_edit_cost as usize;

    while pointer < diff.len() as i64 {
        let p = pointer as usize;
        if diff[p].0 == Op::Equal {
            let short_enough = diff[p].1.chars().count() < edit_cost;
            if short_enough && (post_ins || post_del) {
                equalities.push(pointer);
                pre_ins = post_ins;
                pre_del = post_del;
                last_equality = Some(diff[p].1.clone());
            } else {
                equalities.clear();
                last_equality = None;
            }
            post_ins = false;
            post_del = false;
        } else {
            if diff[p].0 == Op::Delete {
                post_del = true;
            } else {
                post_ins = true;
            }

            if let Some(ref le) = last_equality {
                let four_edits = pre_ins && pre_del && post_ins && post_del;
                let three_edits_short_eq = (pre_ins || pre_del)
                    && (post_ins || post_del)
                    && ((pre_ins as u8 + pre_del as u8 + post_ins as u8 + post_del as u8) >= 3)
                    && le.chars().count() < edit_cost / 2;
                if four_edits || three_edits_short_eq {
                    let eq_idx = *equalities.last().unwrap() as usize;
                    let le_text = le.clone();
                    diff.insert(eq_idx, (Op::Delete, le_text));
                    diff[eq_idx + 1].0 = Op::Insert;
                    // Discard the equality just consumed.
                    equalities.pop();
                    last_equality = None;

                    if pre_ins && pre_del {
                        // No prior entry can be affected; keep going.
                        post_ins = true;
                        post_del = true;
                        equalities.clear();
                    } else {
                        // Discard the previous equality too and resume
                        // scanning from whatever candidate is now exposed.
                        equalities.pop();
                        pointer = equalities.last().copied().unwrap_or(-1);
                        post_ins = false;
                        post_del = false;
                    }
                    changes = true;
                }
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(diff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::main;

    #[test]
    fn semantic_cleanup_merges_short_islands() {
        let mut p = main("the cat sat on the mat", "the cat sat on the bat", &Options::default());
        cleanup_semantic(&mut p);
        let src: String = p
            .iter()
            .filter(|(t, _)| *t != Op::Insert)
            .map(|(_, s)| s.as_str())
            .collect();
        let dst: String = p
            .iter()
            .filter(|(t, _)| *t != Op::Delete)
            .map(|(_, s)| s.as_str())
            .collect();
        assert_eq!(src, "the cat sat on the mat");
        assert_eq!(dst, "the cat sat on the bat");
    }

    #[test]
    fn efficiency_cleanup_fuses_short_equalities() {
        let mut diff = vec![
            (Op::Delete, "ab".to_string()),
            (Op::Insert, "12".to_string()),
            (Op::Equal, "wxyz".to_string()),
            (Op::Delete, "cd".to_string()),
            (Op::Insert, "34".to_string()),
        ];
        let opts = Options {
            diff_edit_cost: 5,
            ..Options::default()
        };
        cleanup_efficiency(&mut diff, &opts);
        assert_eq!(
            diff,
            vec![
                (Op::Delete, "abwxyzcd".to_string()),
                (Op::Insert, "12wxyz34".to_string()),
            ]
        );
    }

    #[test]
    fn efficiency_cleanup_leaves_long_equalities() {
        let mut diff = vec![
            (Op::Delete, "ab".to_string()),
            (Op::Insert, "12".to_string()),
            (Op::Equal, "wxyz".to_string()),
            (Op::Delete, "cd".to_string()),
            (Op::Insert, "34".to_string()),
        ];
        let opts = Options {
            diff_edit_cost: 4,
            ..Options::default()
        };
        cleanup_efficiency(&mut diff, &opts);
        assert_eq!(
            diff,
            vec![
                (Op::Delete, "ab".to_string()),
                (Op::Insert, "12".to_string()),
                (Op::Equal, "wxyz".to_string()),
                (Op::Delete, "cd".to_string()),
                (Op::Insert, "34".to_string()),
            ]
        );
    }
}
