//! Error types for the diff, match, and patch engines.
//!
//! Mirrors the `thiserror`-based error enums used throughout
//! `json-joy`'s `json_patch::types` module.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeltaError {
    #[error("INVALID_DELTA: malformed escape in insert token {0:?}")]
    MalformedInsert(String),
    #[error("INVALID_DELTA: non-numeric or negative length {0:?}")]
    InvalidLength(String),
    #[error("INVALID_DELTA: unknown token sign {0:?}")]
    UnknownSign(String),
    #[error("INVALID_DELTA: delta length {delta_len} does not match source length {src_len}")]
    LengthMismatch { delta_len: usize, src_len: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("PATTERN_TOO_LONG: pattern of {0} chars exceeds match_max_bits")]
    PatternTooLong(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("INVALID_PATCH: {0}")]
    InvalidPatch(String),
}
