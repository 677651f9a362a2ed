//! Patch engine: build a rolling-context patch list from an edit, apply
//! it (relocating hunks via the fuzzy matcher when the text has drifted),
//! and serialize it to/from the unified-diff-flavored text format.
//!
//! `crates/json-joy`'s `json_patch` module implements an unrelated JSON
//! Patch (RFC 6902) protocol, not this text-patch-with-drift-tolerance one,
//! so this module is grounded directly on the Bitap matcher and diff core
//! built alongside it plus the walking-cursor style those already establish.

mod apply;
mod assemble;
mod text;
mod types;

pub use types::{Patch, PatchList};

use crate::diff::Diff;
use crate::error::PatchError;
use crate::options::Options;

/// Build a patch list from the diff between `text1` and `text2`.
pub fn make(text1: &str, text2: &str, opts: &Options) -> PatchList {
    assemble::from_texts(text1, text2, opts)
}

/// Build a patch list from a pre-computed edit script, reconstructing its
/// source text from the script's non-INSERT payloads.
pub fn make_from_diffs(diffs: &Diff, opts: &Options) -> PatchList {
    assemble::from_script(diffs, opts)
}

/// Build a patch list from `text1` and an edit script already known to
/// apply to it.
pub fn make_from_text_and_diffs(text1: &str, diffs: &Diff, opts: &Options) -> PatchList {
    assemble::from_text_and_script(text1, diffs, opts)
}

/// Apply `patches` against `text`. Returns the patched text and one
/// success flag per hunk, in order.
pub fn apply(patches: &PatchList, text: &str, opts: &Options) -> (String, Vec<bool>) {
    apply::apply(patches, text, opts)
}

/// Serialize a patch list to its textual form.
pub fn to_text(patches: &PatchList) -> String {
    text::to_text(patches)
}

/// Parse a patch list from its textual form.
pub fn from_text(text: &str) -> Result<PatchList, PatchError> {
    text::from_text(text)
}
