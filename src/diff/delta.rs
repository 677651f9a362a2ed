//! Compact textual encoding of an edit script: `=N`/`-N` keep/drop counts
//! plus percent-encoded inserts, tab-separated. `N` is a count of UTF-16
//! code units, not Rust `char`s, so the wire form stays bit-compatible with
//! other diff-match-patch implementations even across astral-plane text.
//!
//! New module — `util/diff/str.ts`'s Rust port never carried a delta codec
//! over. Modeled on the same percent-encoding approach `codec-m365` uses for
//! OneDrive paths, here matching what JavaScript's `encodeURI` leaves
//! unescaped via [`crate::strings::uri_encode`].

use super::{Diff, Op};
use crate::error::DeltaError;
use crate::strings::{uri_encode, utf16_advance, utf16_len};

/// Serialize a script to its delta form: `=N` keeps `N` UTF-16 code units,
/// `-N` drops `N` UTF-16 code units, `+text` inserts `text` (percent-encoded,
/// with `%20` rewritten back to a literal space for readability).
pub fn to_delta(script: &[(Op, String)]) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(script.len());
    for (op, text) in script {
        let len = utf16_len(text);
        match op {
            Op::Equal => tokens.push(format!("={len}")),
            Op::Delete => tokens.push(format!("-{len}")),
            Op::Insert => {
                tokens.push(format!("+{}", uri_encode(text)));
            }
        }
    }
    tokens.join("\t")
}

/// Parse a delta against `text1`, the source it was taken against.
/// Fails with [`DeltaError`] on a malformed `+` escape, a non-numeric or
/// negative `=`/`-` count, an unrecognized token sign, a count that splits a
/// surrogate pair, or when the final cursor position does not land exactly
/// on `text1`'s UTF-16 length.
pub fn from_delta(text1: &str, delta: &str) -> Result<Diff, DeltaError> {
    let chars: Vec<char> = text1.chars().collect();
    let total_units = utf16_len(text1);
    let mut cursor = 0usize;
    let mut units = 0usize;
    let mut script: Diff = Vec::new();

    if delta.is_empty() {
        if chars.is_empty() {
            return Ok(script);
        }
        return Err(DeltaError::LengthMismatch {
            delta_len: 0,
            src_len: total_units,
        });
    }

    for token in delta.split('\t') {
        if token.is_empty() {
            continue;
        }
        let (sign, rest) = token.split_at(1);
        match sign {
            "+" => {
                let text = decode_insert(rest)?;
                script.push((Op::Insert, text));
            }
            "=" | "-" => {
                let n: usize = rest
                    .parse()
                    .map_err(|_| DeltaError::InvalidLength(rest.to_string()))?;
                let end = utf16_advance(&chars, cursor, n)
                    .ok_or_else(|| DeltaError::InvalidLength(rest.to_string()))?;
                let slice: String = chars[cursor..end].iter().collect();
                cursor = end;
                units += n;
                if sign == "=" {
                    script.push((Op::Equal, slice));
                } else {
                    script.push((Op::Delete, slice));
                }
            }
            other => return Err(DeltaError::UnknownSign(other.to_string())),
        }
    }

    if units != total_units {
        return Err(DeltaError::LengthMismatch {
            delta_len: units,
            src_len: total_units,
        });
    }

    Ok(super::normalize(script))
}

/// Percent-decode one `+` token, rejecting malformed `%XX` escapes.
pub(crate) fn decode_insert(escaped: &str) -> Result<String, DeltaError> {
    crate::strings::uri_decode(escaped).ok_or_else(|| DeltaError::MalformedInsert(escaped.to_string()))
}
