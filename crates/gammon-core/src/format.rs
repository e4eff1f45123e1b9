//! Input format selection.

use std::fs;
use std::path::Path;

use crate::convert::convert_trees;
use crate::error::Error;
use crate::mat::parse_mat;
use crate::model::Match;
use crate::sgf::parse_game_trees;

/// Trait that both input formats implement.
pub trait MatchFormat {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Parse a whole match record held in memory.
    fn parse_str(&self, input: &str) -> Result<Match, Error>;
}

/// Parenthesized property-tree records (`.sgf`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SgfFormat;

impl MatchFormat for SgfFormat {
    fn name(&self) -> &'static str {
        "sgf"
    }

    fn parse_str(&self, input: &str) -> Result<Match, Error> {
        let trees = parse_game_trees(input)?;
        convert_trees(&trees)
    }
}

/// Column-oriented match files (`.mat`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MatFormat;

impl MatchFormat for MatFormat {
    fn name(&self) -> &'static str {
        "mat"
    }

    fn parse_str(&self, input: &str) -> Result<Match, Error> {
        parse_mat(input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Sgf,
    Mat,
}

impl Format {
    /// `.mat` (any case) selects the flat format; everything else is a tree.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mat") => Format::Mat,
            _ => Format::Sgf,
        }
    }

    pub fn parser(self) -> &'static dyn MatchFormat {
        match self {
            Format::Sgf => &SgfFormat,
            Format::Mat => &MatFormat,
        }
    }

    pub fn parse_str(self, input: &str) -> Result<Match, Error> {
        self.parser().parse_str(input)
    }

    /// Read `path` and parse it with the format its extension names.
    pub fn parse_file(path: &Path) -> Result<Match, Error> {
        let format = Self::from_path(path);
        let input = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), format = format.parser().name(), "parsing file");
        format.parse_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Format::from_path(Path::new("match.mat")), Format::Mat);
        assert_eq!(Format::from_path(Path::new("MATCH.MAT")), Format::Mat);
        assert_eq!(Format::from_path(Path::new("match.sgf")), Format::Sgf);
        assert_eq!(Format::from_path(Path::new("match")), Format::Sgf);
        assert_eq!(Format::from_path(Path::new("dir.mat/match.txt")), Format::Sgf);
    }

    #[test]
    fn test_formats_dispatch() {
        let m = Format::Sgf.parse_str("(;PW[a]PB[b];W[31hegf])").unwrap();
        assert_eq!(m.games.len(), 1);

        let m = Format::Mat
            .parse_str(" Game 1\n a : 0   b : 0\n  1) 31: 8/5 6/5\n")
            .unwrap();
        assert_eq!(m.games[0].moves.len(), 1);
    }

    #[test]
    fn test_sgf_empty_input() {
        assert!(SgfFormat.parse_str("  \n").unwrap_err().is_empty_input());
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let err = Format::parse_file(Path::new("/nonexistent/match.sgf")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
