//! difftext — text differencing, fuzzy matching, and patching.
//!
//! Three cooperating engines, each usable on its own:
//!
//! - [`diff`] — Myers O(ND) bisection diff with half-match and line-mode
//!   heuristics, the cleanup passes that turn a raw script into a stable
//!   one, a compact delta codec, and an HTML pretty-printer.
//! - [`match_engine`] — Bitap (shift-or) approximate string search, used
//!   standalone or by the patch engine to relocate drifted hunks.
//! - [`patch`] — rolling-context patch assembly, drift-tolerant
//!   application, and a unified-diff-flavored text format.
//!
//! All three share the tunables in [`Options`] and the primitive string
//! operations in [`strings`].

pub mod diff;
pub mod error;
pub mod match_engine;
pub mod options;
pub mod patch;
pub mod strings;

pub use diff::{Diff, DiffOp, Op};
pub use error::{DeltaError, MatchError, PatchError};
pub use options::Options;
pub use patch::{Patch, PatchList};
