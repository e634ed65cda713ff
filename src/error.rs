//! Library-level error types.
//!
//! Per spec.md §7, only preprocessing's `TooShort` case and the library's
//! I/O boundary (template/config loading) are recoverable at this level;
//! everything a shape tester can fail with (`PreconditionFailed`,
//! `FitPoor`, `GeometryDegenerate`) is carried inline on `TestResult` as
//! "no vote," not surfaced as a `Result::Err` — mirroring `SET_FAIL` /
//! `context.result->fmsg` in `libsr`'s `test_macros.h`, which never
//! aborts the recognition run.
//!
//! Contract violations the spec calls fatal (corrupt `corners` invariants,
//! an unrecognized hierarchy type tag) stay as `assert!`/`panic!`, matching
//! `libsr`'s `assert(0)` / `abort()` at the equivalent call sites in
//! `paleo.c`.

use thiserror::Error;

/// Errors the recognition facade can return.
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// The input stroke had zero points; PaleoSketch and $P both require
    /// at least one point to do anything meaningful.
    #[error("stroke too short: need at least 1 point, got {0}")]
    TooShort(usize),
}

/// Errors surfaced while loading templates, config, or the character-style
/// databases (`data.rs`, `csv_data.rs`).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed entry: {0}")]
    Malformed(String),
}
