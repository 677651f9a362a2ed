//! Tunable knobs shared by the diff, match, and patch engines.
//!
//! Mirrors the options object threaded through
//! `packages/json-joy/src/util/diff/str.ts` and friends, promoted to an
//! explicit struct since Rust has no ambient options-bag convention.

/// All seven tunables, with diff-match-patch's standard defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Deadline for `diff::main`, in seconds. `<= 0.0` means unlimited,
    /// which also disables the half-match heuristic (never trade
    /// minimality for speed when the caller asked for unlimited time).
    pub diff_timeout: f64,
    /// Granularity threshold for `diff::cleanup_efficiency`.
    pub diff_edit_cost: u32,
    /// Bitap rejection ceiling: 0.0 is strict, 1.0 is loose.
    pub match_threshold: f64,
    /// Characters of tolerated drift between the expected and actual match
    /// location.
    pub match_distance: u32,
    /// Maximum pattern length accepted by the Bitap matcher; also the
    /// chunk size used by `patch::split_max`.
    pub match_max_bits: u32,
    /// Accept/reject ratio for imperfect big-delete patch reconciliation.
    pub patch_delete_threshold: f64,
    /// Length of context padding kept around each patch hunk.
    pub patch_margin: u32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            diff_timeout: 1.0,
            diff_edit_cost: 4,
            match_threshold: 0.5,
            match_distance: 1000,
            match_max_bits: 32,
            patch_delete_threshold: 0.5,
            patch_margin: 4,
        }
    }
}

impl Options {
    /// Shorthand for running the diff core with no deadline and full
    /// minimality (also disables half-match).
    pub fn unlimited() -> Self {
        Options {
            diff_timeout: 0.0,
            ..Options::default()
        }
    }
}
