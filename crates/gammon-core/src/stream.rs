//! Character stream with a single-slot lookahead buffer.

use std::fmt;
use std::str::Chars;

/// 1-based line/column of a character in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    fn advance(self, ch: char) -> Position {
        if ch == '\n' {
            Position {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The pushback slot. The held character carries its own position so that
/// a peeked or unread character reports where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookahead {
    Empty,
    Held(char, Position),
}

pub struct CharStream<'a> {
    chars: Chars<'a>,
    lookahead: Lookahead,
    /// Position of the next character pulled from `chars`.
    cursor: Position,
    /// Position of the most recently consumed character.
    last: Position,
}

impl<'a> CharStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
            lookahead: Lookahead::Empty,
            cursor: Position::START,
            last: Position::START,
        }
    }

    /// Look at the next character without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        match self.lookahead {
            Lookahead::Held(ch, _) => Some(ch),
            Lookahead::Empty => {
                let (ch, at) = self.pull()?;
                self.lookahead = Lookahead::Held(ch, at);
                Some(ch)
            }
        }
    }

    /// Push `ch` back so the next `peek`/`next` returns it.
    ///
    /// Only one character of pushback exists. If the buffer is already
    /// occupied (by an earlier `unread` or a `peek`) the held character is
    /// kept and `ch` is handed back as the error.
    pub fn unread(&mut self, ch: char) -> Result<(), char> {
        match self.lookahead {
            Lookahead::Held(..) => Err(ch),
            Lookahead::Empty => {
                self.lookahead = Lookahead::Held(ch, self.last);
                Ok(())
            }
        }
    }

    /// Consume spaces, tabs, carriage returns and newlines.
    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !matches!(ch, ' ' | '\t' | '\r' | '\n') {
                break;
            }
            self.next();
        }
    }

    /// Position of the next character to be returned.
    pub fn position(&self) -> Position {
        match self.lookahead {
            Lookahead::Held(_, at) => at,
            Lookahead::Empty => self.cursor,
        }
    }

    fn pull(&mut self) -> Option<(char, Position)> {
        let ch = self.chars.next()?;
        let at = self.cursor;
        self.cursor = at.advance(ch);
        Some((ch, at))
    }
}

impl Iterator for CharStream<'_> {
    type Item = char;

    /// Consume one character. `None` signals end of input.
    fn next(&mut self) -> Option<char> {
        match std::mem::replace(&mut self.lookahead, Lookahead::Empty) {
            Lookahead::Held(ch, at) => {
                self.last = at;
                Some(ch)
            }
            Lookahead::Empty => {
                let (ch, at) = self.pull()?;
                self.last = at;
                Some(ch)
            }
        }
    }
}
