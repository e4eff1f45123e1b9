//! Backgammon match-record parsing.
//!
//! Two input formats produce the same [`Match`] model: parenthesized
//! property trees (`.sgf`, via [`sgf`] and [`convert`]) and column-oriented
//! match files (`.mat`, via [`mat`]). The model serializes to JSON.

pub mod convert;
pub mod error;
pub mod format;
pub mod mat;
pub mod model;
pub mod points;
pub mod sgf;
pub mod stream;

use std::io::Read;
use std::path::Path;

pub use error::{Error, SyntaxError};
pub use format::{Format, MatFormat, MatchFormat, SgfFormat};
pub use model::Match;

/// Parse tree-format text into a match. Whitespace-only input is
/// [`Error::Empty`].
pub fn parse_sgf(input: &str) -> Result<Match, Error> {
    SgfFormat.parse_str(input)
}

pub fn parse_sgf_reader<R: Read>(mut reader: R) -> Result<Match, Error> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_sgf(&input)
}

pub fn parse_sgf_file<P: AsRef<Path>>(path: P) -> Result<Match, Error> {
    let input = std::fs::read_to_string(path)?;
    parse_sgf(&input)
}

/// Parse flat-format text into a match.
pub fn parse_mat(input: &str) -> Result<Match, Error> {
    MatFormat.parse_str(input)
}

pub fn parse_mat_reader<R: Read>(mut reader: R) -> Result<Match, Error> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_mat(&input)
}

pub fn parse_mat_file<P: AsRef<Path>>(path: P) -> Result<Match, Error> {
    let input = std::fs::read_to_string(path)?;
    parse_mat(&input)
}
