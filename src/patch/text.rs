//! Textual patch format: the unified-diff-flavored `@@ -l,s +l,s @@` header
//! plus one percent-encoded line per diff entry. Header offsets and lengths
//! are counted in UTF-16 code units, matching the wire contract other
//! diff-match-patch implementations expect.
//!
//! New module — the header regex itself is a fresh choice for this crate.
//! `crates/json-joy`'s own `regex` usage (`json_patch::apply`'s `Matches`
//! operation) builds a user-supplied pattern rather than parsing a fixed
//! wire grammar, so it's not a precedent for this header format. Reuses
//! [`crate::strings::uri_encode`]/`uri_decode` for the per-line payload.

use std::fmt;

use regex::Regex;

use super::types::{Patch, PatchList};
use crate::diff::Op;
use crate::error::PatchError;
use crate::strings::{uri_decode, uri_encode, utf16_len};

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let length1: usize = self
            .diffs
            .iter()
            .filter(|(op, _)| *op != Op::Insert)
            .map(|(_, text)| utf16_len(text))
            .sum();
        let length2: usize = self
            .diffs
            .iter()
            .filter(|(op, _)| *op != Op::Delete)
            .map(|(_, text)| utf16_len(text))
            .sum();
        let coords1 = format_coords(self.start1_u16, length1);
        let coords2 = format_coords(self.start2_u16, length2);
        writeln!(f, "@@ -{coords1} +{coords2} @@")?;
        for (op, text) in &self.diffs {
            let sign = match op {
                Op::Insert => '+',
                Op::Delete => '-',
                Op::Equal => ' ',
            };
            writeln!(f, "{sign}{}", uri_encode(text))?;
        }
        Ok(())
    }
}

fn format_coords(start: usize, length: usize) -> String {
    match length {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        n => format!("{},{n}", start + 1),
    }
}

/// Serialize a patch list to its textual form: each patch's `Display`
/// rendering, concatenated.
pub fn to_text(patches: &PatchList) -> String {
    patches.iter().map(|p| p.to_string()).collect()
}

/// Parse a patch list from its textual form.
pub fn from_text(text: &str) -> Result<PatchList, PatchError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let header = Regex::new(r"^@@ -(\d+),?(\d*) \+(\d+),?(\d*) @@$").expect("static regex");
    let lines: Vec<&str> = text.split('\n').collect();
    let mut patches = PatchList::new();
    let mut pointer = 0usize;

    while pointer < lines.len() {
        if lines[pointer].is_empty() && pointer == lines.len() - 1 {
            break;
        }
        let caps = header
            .captures(lines[pointer])
            .ok_or_else(|| PatchError::InvalidPatch(lines[pointer].to_string()))?;

        let mut patch = Patch::new();
        let (start1, length1) = parse_coords(&caps[1], &caps[2])?;
        let (start2, length2) = parse_coords(&caps[3], &caps[4])?;
        patch.start1 = start1;
        patch.start1_u16 = start1;
        patch.length1 = length1;
        patch.start2 = start2;
        patch.start2_u16 = start2;
        patch.length2 = length2;
        pointer += 1;

        while pointer < lines.len() {
            let line = lines[pointer];
            let Some(sign) = line.chars().next() else {
                pointer += 1;
                continue;
            };
            if sign == '@' {
                break;
            }
            let payload = uri_decode(&line[1..])
                .ok_or_else(|| PatchError::InvalidPatch(line.to_string()))?;
            match sign {
                '-' => patch.diffs.push((Op::Delete, payload)),
                '+' => patch.diffs.push((Op::Insert, payload)),
                ' ' => patch.diffs.push((Op::Equal, payload)),
                other => {
                    return Err(PatchError::InvalidPatch(format!(
                        "unrecognized patch line sign {other:?}"
                    )))
                }
            }
            pointer += 1;
        }

        patches.push(patch);
    }

    Ok(patches)
}

fn parse_coords(start: &str, length: &str) -> Result<(usize, usize), PatchError> {
    let raw_start: usize = start
        .parse()
        .map_err(|_| PatchError::InvalidPatch(format!("bad start {start:?}")))?;
    if length.is_empty() {
        Ok((raw_start.saturating_sub(1), 1))
    } else if length == "0" {
        Ok((raw_start, 0))
    } else {
        let len: usize = length
            .parse()
            .map_err(|_| PatchError::InvalidPatch(format!("bad length {length:?}")))?;
        Ok((raw_start.saturating_sub(1), len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Diff;

    #[test]
    fn round_trips_single_patch() {
        let diffs: Diff = vec![
            (Op::Equal, "jump".to_string()),
            (Op::Delete, "s".to_string()),
            (Op::Insert, "ed".to_string()),
            (Op::Equal, " over the".to_string()),
        ];
        let patch = Patch {
            start1: 0,
            start2: 0,
            start1_u16: 0,
            start2_u16: 0,
            length1: 14,
            length2: 15,
            diffs,
        };
        let text = patch.to_string();
        assert!(text.starts_with("@@ -1,14 +1,15 @@\n"));

        let parsed = from_text(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], patch);
    }

    #[test]
    fn empty_text_yields_empty_list() {
        assert!(from_text("").unwrap().is_empty());
    }

    #[test]
    fn malformed_header_fails() {
        assert!(from_text("not a header\n+x\n").is_err());
    }

    #[test]
    fn astral_char_header_uses_utf16_units() {
        let diffs: Diff = vec![
            (Op::Equal, "a".to_string()),
            (Op::Delete, "\u{1F642}".to_string()),
            (Op::Insert, "b".to_string()),
        ];
        let patch = Patch {
            start1: 0,
            start2: 0,
            start1_u16: 0,
            start2_u16: 0,
            length1: 0,
            length2: 0,
            diffs,
        };
        let text = patch.to_string();
        // "a" is 1 unit, the astral char is 2, so length1 is 3 even though
        // only 2 `char`s make up the non-inserted payload.
        assert!(text.starts_with("@@ -1,3 +1,2 @@\n"));

        let parsed = from_text(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].diffs, patch.diffs);
        assert_eq!(parsed[0].start1_u16, 0);
        assert_eq!(parsed[0].length1, 3);
    }

    #[test]
    fn zero_length_coords_round_trip() {
        let patch = Patch {
            start1: 5,
            start2: 5,
            start1_u16: 5,
            start2_u16: 5,
            length1: 0,
            length2: 3,
            diffs: vec![(Op::Insert, "abc".to_string())],
        };
        let text = patch.to_string();
        assert!(text.starts_with("@@ -5,0 +6,3 @@\n"));
        let parsed = from_text(&text).unwrap();
        assert_eq!(parsed[0], patch);
    }
}
