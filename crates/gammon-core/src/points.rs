//! Point notation codecs and the fixed 8-slot move encoding.
//!
//! Board points are 0..=23, the bar is 24 and borne-off is 25. The tree
//! format writes points as single letters (`a`..`x`, `y` bar, `z` off); the
//! flat format writes numerals 1..=24 and the words `bar` / `off`.

use serde::{Deserialize, Serialize};

pub const BAR: i8 = 24;
pub const OFF: i8 = 25;
pub const UNUSED: i8 = -1;

/// Maximum number of (from, to) pairs in one move.
pub const MAX_PAIRS: usize = 4;

/// Letter for each point, indexed by point number (24 = bar, 25 = off).
const POINT_LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Decode a tree-format point letter.
pub fn point_from_letter(ch: char) -> Option<i8> {
    if !ch.is_ascii() {
        return None;
    }
    POINT_LETTERS
        .iter()
        .position(|&c| c == ch as u8)
        .map(|idx| idx as i8)
}

/// Encode a point as its tree-format letter.
pub fn letter_from_point(point: i8) -> Option<char> {
    usize::try_from(point)
        .ok()
        .and_then(|idx| POINT_LETTERS.get(idx))
        .map(|&c| c as char)
}

/// Which textual convention a point token is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointNotation {
    /// `a`..`x`, `y` (bar), `z` (off)
    Letter,
    /// `1`..`24`, with an optional trailing `*` hit marker
    Numeral,
}

impl PointNotation {
    /// Decode one point token. Both notations accept the words `bar` and `off`.
    pub fn decode(self, token: &str) -> Option<i8> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("bar") {
            return Some(BAR);
        }
        if token.eq_ignore_ascii_case("off") {
            return Some(OFF);
        }

        match self {
            PointNotation::Letter => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => point_from_letter(ch),
                    _ => None,
                }
            }
            PointNotation::Numeral => {
                let n: i8 = token.trim_end_matches('*').parse().ok()?;
                (1..=24).contains(&n).then(|| n - 1)
            }
        }
    }

    /// Render one point. Bar and off always render as words.
    pub fn render(self, point: i8) -> String {
        match point {
            BAR => "bar".to_string(),
            OFF => "off".to_string(),
            _ => match self {
                PointNotation::Letter => letter_from_point(point)
                    .map(String::from)
                    .unwrap_or_else(|| "?".to_string()),
                PointNotation::Numeral => (point + 1).to_string(),
            },
        }
    }
}

/// Side 1 faces the opposite direction: its board points are mirrored.
fn mirror(point: i8, side: u8) -> i8 {
    if side == 1 && (0..=23).contains(&point) {
        23 - point
    } else {
        point
    }
}

/// A move as up to four (from, to) pairs; every unused slot holds -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveEncoding(pub [i8; 8]);

impl Default for MoveEncoding {
    fn default() -> Self {
        Self::NONE
    }
}

impl MoveEncoding {
    pub const NONE: MoveEncoding = MoveEncoding([UNUSED; 8]);

    /// Build from pairs, keeping at most four.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i8, i8)>,
    {
        let mut slots = [UNUSED; 8];
        for (i, (from, to)) in pairs.into_iter().take(MAX_PAIRS).enumerate() {
            slots[i * 2] = from;
            slots[i * 2 + 1] = to;
        }
        MoveEncoding(slots)
    }

    /// Decode tree-format point codes, two letters per pair. Decoding stops
    /// at the first letter that is not a point code or at a dangling letter.
    pub fn from_letters(code: &str) -> Self {
        let chars: Vec<char> = code.chars().collect();
        let pairs = chars
            .chunks_exact(2)
            .map_while(|pair| Some((point_from_letter(pair[0])?, point_from_letter(pair[1])?)));
        Self::from_pairs(pairs)
    }

    /// Decode a flat-format move such as `24/18 13/11*` or `8/5(2)`.
    /// Unreadable parts are skipped; "Can't move" yields no pairs.
    pub fn from_numerals(text: &str) -> Self {
        if text.to_ascii_lowercase().contains("can't move") {
            return Self::NONE;
        }

        let mut pairs = Vec::new();
        for part in text.split_whitespace() {
            let (body, repeat) = split_repeat(part);
            let Some((from, to)) = body.split_once('/') else {
                continue;
            };
            let (Some(from), Some(to)) = (
                PointNotation::Numeral.decode(from),
                PointNotation::Numeral.decode(to),
            ) else {
                continue;
            };
            pairs.extend(std::iter::repeat((from, to)).take(repeat));
        }
        Self::from_pairs(pairs)
    }

    /// The used (from, to) pairs, up to the first -1.
    pub fn pairs(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.0
            .chunks_exact(2)
            .map(|p| (p[0], p[1]))
            .take_while(|&(from, _)| from != UNUSED)
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == UNUSED
    }

    /// Tree-format rendering, e.g. `x/r h/e`; points are mirrored for side 1.
    pub fn render(&self, side: u8) -> String {
        if self.is_empty() {
            return "no move".to_string();
        }
        self.pairs()
            .map(|(from, to)| {
                format!(
                    "{}/{}",
                    PointNotation::Letter.render(mirror(from, side)),
                    PointNotation::Letter.render(mirror(to, side))
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Inverse of [`MoveEncoding::render`].
    pub fn parse_rendered(text: &str, side: u8) -> Option<Self> {
        let text = text.trim();
        if text == "no move" {
            return Some(Self::NONE);
        }

        let mut pairs = Vec::new();
        for part in text.split_whitespace() {
            let (from, to) = part.split_once('/')?;
            let from = PointNotation::Letter.decode(from)?;
            let to = PointNotation::Letter.decode(to)?;
            pairs.push((mirror(from, side), mirror(to, side)));
        }
        if pairs.is_empty() || pairs.len() > MAX_PAIRS {
            return None;
        }
        Some(Self::from_pairs(pairs))
    }
}

/// Split a trailing `(n)` repeat count off a flat-format move part.
fn split_repeat(part: &str) -> (&str, usize) {
    if let Some(open) = part.find('(') {
        if let Some(count) = part[open + 1..]
            .strip_suffix(')')
            .and_then(|n| n.parse::<usize>().ok())
        {
            return (&part[..open], count.clamp(1, MAX_PAIRS));
        }
    }
    (part, 1)
}
