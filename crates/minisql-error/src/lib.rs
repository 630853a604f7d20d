//! Error types for the minisql front end.
//!
//! Lexing and parsing each fail fatally with a positioned error; there is
//! no partial-success mode. [`MinisqlError`] is the unified error returned
//! by the top-level entry points, wrapping whichever stage failed first.

use thiserror::Error;

/// Convenience alias for front-end results.
pub type Result<T> = std::result::Result<T, MinisqlError>;

/// Fatal tokenization failure.
///
/// Produced when no recognizer matches at the cursor. Positions are
/// one-based: line 1, column 1 is the first character of the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{col}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl LexError {
    #[must_use]
    pub fn new(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            message: message.into(),
            line,
            col,
        }
    }
}

/// Fatal parse failure.
///
/// Reported once every statement-kind trial is exhausted; carries the
/// position of the token the furthest-reaching trial stopped at. A zero
/// position means the failure could not be tied to any token (empty or
/// fully consumed input).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            message: message.into(),
            line,
            col,
        }
    }
}

/// Unified front-end error.
///
/// Lex failures are passed through verbatim; parse failures likewise. The
/// variant tells the caller which stage rejected the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MinisqlError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
