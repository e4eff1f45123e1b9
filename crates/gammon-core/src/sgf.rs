//! Recursive-descent parser for the bracket-property game-tree format.
//!
//! Only the primary line of play is kept: each game tree becomes a flat
//! chain of nodes, and nested variations are parsed for balance and then
//! dropped.

use tracing::debug;

use crate::error::SyntaxError;
use crate::stream::CharStream;

/// One `;`-introduced node: property name → raw values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    properties: Vec<(String, Vec<String>)>,
}

impl Node {
    /// All raw values of a property.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// First raw value of a property.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values(name).is_some()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.properties
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// A repeated name replaces the earlier values in place.
    pub fn insert(&mut self, name: String, values: Vec<String>) {
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = values,
            None => self.properties.push((name, values)),
        }
    }
}

/// The primary line of one game tree, root node first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameTree {
    pub nodes: Vec<Node>,
}

impl GameTree {
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }
}

/// Parse every top-level game tree in `input`, in encounter order.
///
/// Whitespace-only input yields an empty list.
pub fn parse_game_trees(input: &str) -> Result<Vec<GameTree>, SyntaxError> {
    TreeParser::new(input).parse_all()
}

pub struct TreeParser<'a> {
    stream: CharStream<'a>,
}

impl<'a> TreeParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            stream: CharStream::new(input),
        }
    }

    pub fn parse_all(&mut self) -> Result<Vec<GameTree>, SyntaxError> {
        let mut trees = Vec::new();
        loop {
            self.stream.skip_whitespace();
            match self.stream.peek() {
                None => break,
                Some('(') => trees.push(self.parse_game_tree()?),
                Some(found) => {
                    return Err(SyntaxError::UnexpectedChar {
                        found,
                        expected: "'(' to open a game tree",
                        at: self.stream.position(),
                    })
                }
            }
        }
        debug!(trees = trees.len(), "parsed game trees");
        Ok(trees)
    }

    /// `'(' NodeSeq Variation* ')'`
    fn parse_game_tree(&mut self) -> Result<GameTree, SyntaxError> {
        self.expect('(', "'(' to open a game tree")?;

        let mut tree = GameTree::default();
        let mut in_variations = false;

        loop {
            self.stream.skip_whitespace();
            let at = self.stream.position();
            match self.stream.peek() {
                None => return Err(SyntaxError::UnexpectedEof { at }),
                Some(';') if !in_variations => tree.nodes.push(self.parse_node()?),
                Some('(') if !tree.nodes.is_empty() => {
                    self.skip_variation()?;
                    in_variations = true;
                }
                Some(')') if !tree.nodes.is_empty() => {
                    self.stream.next();
                    break;
                }
                Some(found) => {
                    let expected = if tree.nodes.is_empty() {
                        "';' to open a node"
                    } else if in_variations {
                        "'(' or ')'"
                    } else {
                        "';', '(' or ')'"
                    };
                    return Err(SyntaxError::UnexpectedChar { found, expected, at });
                }
            }
        }

        Ok(tree)
    }

    /// `';' Property*`
    fn parse_node(&mut self) -> Result<Node, SyntaxError> {
        self.expect(';', "';' to open a node")?;

        let mut node = Node::default();
        loop {
            self.stream.skip_whitespace();
            match self.stream.peek() {
                Some(ch) if ch.is_ascii_alphabetic() => {
                    let (name, values) = self.parse_property()?;
                    node.insert(name, values);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// `Name Value+`, where a name is one or two ASCII letters.
    fn parse_property(&mut self) -> Result<(String, Vec<String>), SyntaxError> {
        let at = self.stream.position();
        let mut name = String::with_capacity(2);

        match self.stream.next() {
            Some(ch) if ch.is_ascii_alphabetic() => name.push(ch),
            Some(found) => {
                return Err(SyntaxError::UnexpectedChar {
                    found,
                    expected: "a property name",
                    at,
                })
            }
            None => return Err(SyntaxError::UnexpectedEof { at }),
        }
        if let Some(ch) = self.stream.peek() {
            if ch.is_ascii_alphabetic() {
                name.push(ch);
                self.stream.next();
            }
        }

        let mut values = Vec::new();
        loop {
            self.stream.skip_whitespace();
            if self.stream.peek() != Some('[') {
                break;
            }
            values.push(self.parse_value()?);
        }

        if values.is_empty() {
            return Err(SyntaxError::MissingValue { name, at });
        }
        Ok((name, values))
    }

    /// `'[' (Escaped | Char)* ']'`. A backslash takes the next character
    /// literally.
    fn parse_value(&mut self) -> Result<String, SyntaxError> {
        let at = self.stream.position();
        self.expect('[', "'[' to open a value")?;

        let mut value = String::new();
        loop {
            match self.stream.next() {
                None => return Err(SyntaxError::UnterminatedValue { at }),
                Some('\\') => match self.stream.next() {
                    Some(ch) => value.push(ch),
                    None => return Err(SyntaxError::UnterminatedValue { at }),
                },
                Some(']') => return Ok(value),
                Some(ch) => value.push(ch),
            }
        }
    }

    /// Consume a balanced `( ... )` variation without modelling it.
    fn skip_variation(&mut self) -> Result<(), SyntaxError> {
        let start = self.stream.position();
        self.expect('(', "'(' to open a variation")?;

        let mut depth = 1usize;
        while depth > 0 {
            match self.stream.peek() {
                None => {
                    return Err(SyntaxError::UnexpectedEof {
                        at: self.stream.position(),
                    })
                }
                // values may contain parentheses
                Some('[') => {
                    self.parse_value()?;
                }
                Some('(') => {
                    self.stream.next();
                    depth += 1;
                }
                Some(')') => {
                    self.stream.next();
                    depth -= 1;
                }
                Some(_) => {
                    self.stream.next();
                }
            }
        }

        debug!(at = %start, "discarded variation");
        Ok(())
    }

    fn expect(&mut self, want: char, expected: &'static str) -> Result<(), SyntaxError> {
        let at = self.stream.position();
        match self.stream.next() {
            Some(ch) if ch == want => Ok(()),
            Some(found) => Err(SyntaxError::UnexpectedChar { found, expected, at }),
            None => Err(SyntaxError::UnexpectedEof { at }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Position;

    fn single(input: &str) -> GameTree {
        let mut trees = parse_game_trees(input).unwrap();
        assert_eq!(trees.len(), 1);
        trees.remove(0)
    }

    #[test]
    fn test_parse_linear_chain() {
        let tree = single("(;FF[4]GM[6]PW[alice]PB[bob];W[31hegf];B[52lpab])");
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.nodes[0].first("PW"), Some("alice"));
        assert_eq!(tree.nodes[1].first("W"), Some("31hegf"));
        assert_eq!(tree.nodes[2].first("B"), Some("52lpab"));
    }

    #[test]
    fn test_property_order_is_preserved() {
        let tree = single("(;PW[a]PB[b]AP[c])");
        let names: Vec<&str> = tree.nodes[0].properties().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["PW", "PB", "AP"]);
    }

    #[test]
    fn test_multiple_values() {
        let tree = single("(;AW[a][a][b] [c]\n[y])");
        assert_eq!(
            tree.nodes[0].values("AW").unwrap(),
            &["a", "a", "b", "c", "y"]
        );
    }

    #[test]
    fn test_escaped_closing_bracket() {
        let tree = single(r"(;C[a\]b])");
        assert_eq!(tree.nodes[0].first("C"), Some("a]b"));
    }

    #[test]
    fn test_escaped_backslash_and_plain_char() {
        let tree = single(r"(;C[x\\y\z])");
        assert_eq!(tree.nodes[0].first("C"), Some(r"x\yz"));
    }

    #[test]
    fn test_whitespace_between_tokens() {
        let tree = single("  (\n ; PW [a]\n\tPB[b] \r\n ; W[11] )  \n");
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(tree.nodes[0].first("PB"), Some("b"));
    }

    #[test]
    fn test_single_letter_and_lowercase_names() {
        let tree = single("(;C[note]xy[1])");
        assert_eq!(tree.nodes[0].first("C"), Some("note"));
        assert_eq!(tree.nodes[0].first("xy"), Some("1"));
    }

    #[test]
    fn test_repeated_property_replaces_values() {
        let tree = single("(;C[one]PW[p]C[two])");
        assert_eq!(tree.nodes[0].values("C").unwrap(), &["two"]);
        assert_eq!(tree.nodes[0].properties().count(), 2);
    }

    #[test]
    fn test_empty_node_is_kept() {
        let tree = single("(;PW[a];;W[11])");
        assert_eq!(tree.nodes.len(), 3);
        assert!(tree.nodes[1].is_empty());
    }

    #[test]
    fn test_variations_are_discarded() {
        let tree = single("(;PW[a];W[31hegf](;B[11](;B[22]))(;C[x (y]))");
        assert_eq!(tree.nodes.len(), 2);
        assert!(tree.nodes.iter().all(|n| !n.has("B")));
    }

    #[test]
    fn test_escaped_bracket_inside_discarded_variation() {
        let tree = single(r"(;W[11](;C[\]) (]))");
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn test_two_trees_in_encounter_order() {
        let trees = parse_game_trees("(;GC[first])\n(;GC[second])").unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].nodes[0].first("GC"), Some("first"));
        assert_eq!(trees[1].nodes[0].first("GC"), Some("second"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_game_trees("").unwrap().is_empty());
        assert!(parse_game_trees(" \n\t").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_value() {
        let err = parse_game_trees("(;C[abc").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::UnterminatedValue {
                at: Position { line: 1, column: 4 }
            }
        );
    }

    #[test]
    fn test_unterminated_after_escape() {
        let err = parse_game_trees(r"(;C[abc\").unwrap_err();
        assert!(matches!(err, SyntaxError::UnterminatedValue { .. }));
    }

    #[test]
    fn test_missing_opening_paren() {
        let err = parse_game_trees(";PW[a])").unwrap_err();
        assert!(matches!(
            err,
            SyntaxError::UnexpectedChar { found: ';', .. }
        ));
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        let err = parse_game_trees("(;PW[a]) junk").unwrap_err();
        match err {
            SyntaxError::UnexpectedChar { found, at, .. } => {
                assert_eq!(found, 'j');
                assert_eq!(at, Position { line: 1, column: 10 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_game_tree_is_an_error() {
        let err = parse_game_trees("()").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedChar { found: ')', .. }));
    }

    #[test]
    fn test_property_without_value() {
        let err = parse_game_trees("(;PW PB[b])").unwrap_err();
        match err {
            SyntaxError::MissingValue { name, .. } => assert_eq!(name, "PW"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_tree() {
        let err = parse_game_trees("(;PW[a]").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_unclosed_variation() {
        let err = parse_game_trees("(;PW[a](;B[11]").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_node_after_variation_is_an_error() {
        let err = parse_game_trees("(;PW[a](;B[11]);W[22])").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedChar { found: ';', .. }));
    }

    #[test]
    fn test_unexpected_character_in_node() {
        let err = parse_game_trees("(;PW[a] 5)").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedChar { found: '5', .. }));
    }
}
