//! The patch record model: a hunk anchored at source/destination offsets,
//! carrying the embedded edit script (context included) that reconstructs it.

use crate::diff::Diff;

/// One hunk of a patch set.
///
/// `start1`/`length1` locate the hunk in the text the patch was made
/// against; `start2`/`length2` locate it in the text the patch produces.
/// `diffs` is the embedded edit script, including the EQUAL runs of
/// context padding either side of the actual edit.
///
/// `start1`/`start2` are `char` (Unicode scalar value) offsets, used for all
/// internal cursor arithmetic during assembly and apply. `start1_u16`/
/// `start2_u16` track the same positions in UTF-16 code units, the unit the
/// `@@ -l,s +l,s @@` wire header and [`Display`](std::fmt::Display) report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    pub start1: usize,
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
    pub(crate) start1_u16: usize,
    pub(crate) start2_u16: usize,
    pub diffs: Diff,
}

impl Patch {
    pub(crate) fn new() -> Self {
        Patch::default()
    }
}

/// An ordered set of hunks, applied left to right.
pub type PatchList = Vec<Patch>;
