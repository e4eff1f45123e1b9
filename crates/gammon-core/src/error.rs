//! Parser error types

use thiserror::Error;

use crate::stream::Position;

/// Grammar violations in the tree format. Any of these aborts the whole parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected end of input at {at}")]
    UnexpectedEof { at: Position },

    #[error("unexpected character {found:?} at {at}, expected {expected}")]
    UnexpectedChar {
        found: char,
        expected: &'static str,
        at: Position,
    },

    #[error("unterminated property value starting at {at}")]
    UnterminatedValue { at: Position },

    #[error("property {name} at {at} has no value")]
    MissingValue { name: String, at: Position },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed input: {0}")]
    Syntax(#[from] SyntaxError),

    /// Nothing to convert: no game trees, or no games after conversion.
    #[error("Empty input: {0}")]
    Empty(&'static str),

    #[error("Malformed flat-format input at line {line}: {message}")]
    Flat { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the "nothing found" condition as opposed to malformed input.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::Empty(_))
    }
}
