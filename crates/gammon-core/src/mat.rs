//! Flat match-file parsing, line and regex based.
//!
//! ```text
//! ; [EventDate "2025.11.08"]
//!  7 point match
//!
//!  Game 1
//!  alice : 0                   bob : 0
//!   1)                             41: 13/9 24/23
//!   2) 31: 6/5 8/5                 41: 6/5 9/5
//!   3)  Doubles => 2                Takes
//!                                   Wins 2 points
//! ```

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::error::Error;
use crate::model::{Annotations, CheckerMove, CubeAction, Game, Match, MatchMetadata, MoveRecord};
use crate::points::MoveEncoding;

static COMMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[;#]\s*(.*)$").expect("valid regex"));

/// `[Tag "value"]` inside a comment line.
static COMMENT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("valid regex"));

static MATCH_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s+point\s+match\s*$").expect("valid regex"));

static GAME_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Game\s+(\d+)\s*$").expect("valid regex"));

static SCORE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S.*?)\s*:\s*(\d+)\s+(\S.*?)\s*:\s*(\d+)\s*$").expect("valid regex")
});

/// Row content keeps its leading whitespace: it tells an empty left column.
static MOVE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\)(.*)$").expect("valid regex"));

static COLUMN_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{3,}").expect("valid regex"));

static WINS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Wins\s+(\d+)\s+points?\s*$").expect("valid regex"));

static DICE_AND_MOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([1-6])([1-6]):\s*(.*)$").expect("valid regex"));

static DOUBLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Doubles\s*=>\s*(\d+)$").expect("valid regex"));

/// Parse a whole flat match file.
pub fn parse_mat(input: &str) -> Result<Match, Error> {
    let mut metadata = MatchMetadata::default();
    let mut games = Vec::new();
    let mut current: Option<GameState> = None;
    let mut crawford_played = false;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(caps) = COMMENT_LINE.captures(line) {
            apply_comment(&caps[1], &mut metadata);
            continue;
        }

        if let Some(caps) = MATCH_HEADER.captures(line) {
            metadata.match_length = caps[1].parse().unwrap_or(0);
            continue;
        }

        if let Some(caps) = GAME_HEADER.captures(line) {
            if let Some(state) = current.take() {
                let game = state.finish();
                crawford_played |= game.crawford_game;
                games.push(game);
            }
            let number = caps[1].parse().unwrap_or(0);
            current = Some(GameState::new(number, crawford_played));
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }

        match current.as_mut() {
            Some(state) => state.feed(line, line_no, &mut metadata)?,
            None => debug!(line = line_no, "ignoring line outside any game"),
        }
    }

    if let Some(state) = current.take() {
        games.push(state.finish());
    }

    if games.is_empty() {
        return Err(Error::Empty("no games found"));
    }

    debug!(games = games.len(), length = metadata.match_length, "parsed flat match");
    Ok(Match { metadata, games })
}

/// Metadata tags in `;` comments. Empty values are ignored.
fn apply_comment(comment: &str, metadata: &mut MatchMetadata) {
    for caps in COMMENT_TAG.captures_iter(comment) {
        let value = caps[2].trim();
        if value.is_empty() {
            continue;
        }
        match &caps[1] {
            "EventDate" => match NaiveDate::parse_from_str(value, "%Y.%m.%d") {
                Ok(date) => metadata.date = Some(date.format("%Y-%m-%d").to_string()),
                Err(e) => debug!(value, error = %e, "unreadable event date"),
            },
            "Event" => metadata.event = Some(value.to_string()),
            "Round" => metadata.round = Some(value.to_string()),
            "Site" => metadata.place = Some(value.to_string()),
            "Transcriber" => metadata.annotator = Some(value.to_string()),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Score,
    Moves,
    Finished,
}

struct GameState {
    game: Game,
    phase: Phase,
    last_actor: Option<u8>,
    /// An earlier game in the match was the Crawford game.
    crawford_played: bool,
}

impl GameState {
    fn new(number: u32, crawford_played: bool) -> Self {
        Self {
            game: Game {
                game_number: number,
                ..Game::default()
            },
            phase: Phase::Score,
            last_actor: None,
            crawford_played,
        }
    }

    fn feed(&mut self, line: &str, line_no: usize, metadata: &mut MatchMetadata) -> Result<(), Error> {
        match self.phase {
            Phase::Score => {
                self.score_line(line, line_no, metadata)?;
                self.phase = Phase::Moves;
            }
            Phase::Moves => {
                if let Some(caps) = WINS_LINE.captures(line) {
                    self.game.points = caps[1].parse().unwrap_or(0);
                    if let Some(player) = self.last_actor {
                        self.game.winner = player as i8;
                    }
                    self.phase = Phase::Finished;
                } else if let Some(caps) = MOVE_ROW.captures(line) {
                    let content = caps.get(2).map_or("", |m| m.as_str());
                    self.move_row(content);
                } else {
                    debug!(line = line_no, "ignoring unrecognized line");
                }
            }
            Phase::Finished => debug!(line = line_no, "ignoring line after game end"),
        }
        Ok(())
    }

    fn score_line(
        &mut self,
        line: &str,
        line_no: usize,
        metadata: &mut MatchMetadata,
    ) -> Result<(), Error> {
        let caps = SCORE_LINE.captures(line).ok_or_else(|| Error::Flat {
            line: line_no,
            message: format!("invalid score line: {}", line.trim()),
        })?;

        let score1: u32 = caps[2].parse().unwrap_or(0);
        let score2: u32 = caps[4].parse().unwrap_or(0);
        self.game.score = [score1, score2];

        if metadata.player1.is_empty() && metadata.player2.is_empty() {
            metadata.player1 = player_name(&caps[1]);
            metadata.player2 = player_name(&caps[3]);
        }

        let length = metadata.match_length;
        self.game.crawford = length > 0;
        self.game.jacoby = length == 0;
        if length > 0 && !self.crawford_played {
            let at_point = |s: u32| s + 1 == length;
            self.game.crawford_game = at_point(score1) != at_point(score2);
        }
        Ok(())
    }

    fn move_row(&mut self, content: &str) {
        for (player, part) in split_columns(content).into_iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            let player = player as u8;
            let action = CubeAction {
                player,
                cube_value: None,
                notes: Annotations::default(),
            };

            if let Some(caps) = DOUBLES.captures(part) {
                self.push(
                    player,
                    MoveRecord::Double(CubeAction {
                        cube_value: caps[1].parse().ok(),
                        ..action
                    }),
                );
            } else if part == "Takes" {
                self.push(player, MoveRecord::Take(action));
            } else if part == "Drops" {
                self.push(player, MoveRecord::Drop(action));
                let winner = 1 - player;
                self.game.winner = winner as i8;
                self.last_actor = Some(winner);
                break;
            } else if let Some(caps) = DICE_AND_MOVE.captures(part) {
                let text = caps[3].trim();
                let dice = [caps[1].parse().unwrap_or(0), caps[2].parse().unwrap_or(0)];
                self.push(
                    player,
                    MoveRecord::Move(CheckerMove {
                        player,
                        dice,
                        encoded: MoveEncoding::from_numerals(text),
                        move_string: text.to_string(),
                        notes: Annotations::default(),
                    }),
                );
            } else {
                debug!(part, "ignoring unrecognized column");
            }
        }
    }

    fn push(&mut self, player: u8, record: MoveRecord) {
        self.game.moves.push(record);
        self.last_actor = Some(player);
    }

    fn finish(self) -> Game {
        self.game
    }
}

/// Names may carry a trailing `, rating`.
fn player_name(raw: &str) -> String {
    raw.split(',').next().unwrap_or(raw).trim().to_string()
}

/// Split row content into the two player columns. A gap of three or more
/// spaces separates them; leading gap means the left column is empty.
fn split_columns(content: &str) -> [&str; 2] {
    match COLUMN_GAP.find(content) {
        Some(gap) if gap.start() == 0 => {
            let rest = &content[gap.end()..];
            match COLUMN_GAP.find(rest) {
                // indented left entry followed by a right entry
                Some(next) => [rest[..next.start()].trim(), rest[next.end()..].trim()],
                None => ["", rest.trim()],
            }
        }
        Some(gap) => [content[..gap.start()].trim(), content[gap.end()..].trim()],
        None => [content.trim(), ""],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"; [EventDate "2025.11.08"]
; [Event "Club Night"]
; [Round "3"]
; [Site "Monte Carlo"]
; [Transcriber "carol"]

 7 point match

 Game 1
 Player1 : 0                   Player2 : 0
  1)                             41: 13/9 24/23
  2) 31: 6/5 8/5                 41: 6/5 9/5
  3) 31: 24/21 6/5               65: 24/18 23/18
  4)  Doubles => 2                Takes
  5) 64: 13/7 7/3                55: 22/17 8/3 8/3 6/1
                                  Wins 2 points

 Game 2
 Player1 : 0                   Player2 : 2
  1)                             65: 24/18 18/13
  2) 32: 24/21 13/11             64: 24/20 20/14
  3)  Doubles => 2                Drops
      Wins 2 points
"#;

    #[test]
    fn test_parse_sample_metadata() {
        let m = parse_mat(SAMPLE).unwrap();
        let meta = &m.metadata;
        assert_eq!(meta.match_length, 7);
        assert_eq!(meta.date.as_deref(), Some("2025-11-08"));
        assert_eq!(meta.event.as_deref(), Some("Club Night"));
        assert_eq!(meta.round.as_deref(), Some("3"));
        assert_eq!(meta.place.as_deref(), Some("Monte Carlo"));
        assert_eq!(meta.annotator.as_deref(), Some("carol"));
        assert_eq!(meta.player1, "Player1");
        assert_eq!(meta.player2, "Player2");
        assert_eq!(m.games.len(), 2);
    }

    #[test]
    fn test_parse_sample_first_game() {
        let m = parse_mat(SAMPLE).unwrap();
        let game = &m.games[0];
        assert_eq!(game.game_number, 1);
        assert_eq!(game.score, [0, 0]);
        assert!(game.crawford);
        assert!(!game.crawford_game);
        assert!(!game.jacoby);
        assert_eq!(game.points, 2);
        assert_eq!(game.winner, 1);

        let kinds: Vec<&str> = game.moves.iter().map(MoveRecord::kind).collect();
        assert_eq!(
            kinds,
            vec!["move", "move", "move", "move", "move", "double", "take", "move", "move"]
        );

        // opening row has an empty left column
        let MoveRecord::Move(first) = &game.moves[0] else {
            panic!("expected checker move");
        };
        assert_eq!(first.player, 1);
        assert_eq!(first.dice, [4, 1]);
        assert_eq!(first.encoded.0, [12, 8, 23, 22, -1, -1, -1, -1]);
        assert_eq!(first.move_string, "13/9 24/23");

        let MoveRecord::Double(double) = &game.moves[5] else {
            panic!("expected double");
        };
        assert_eq!(double.player, 0);
        assert_eq!(double.cube_value, Some(2));
        assert_eq!(game.moves[6].player(), Some(1));
    }

    #[test]
    fn test_parse_sample_drop_decides_winner() {
        let m = parse_mat(SAMPLE).unwrap();
        let game = &m.games[1];
        assert_eq!(game.score, [0, 2]);
        assert_eq!(game.winner, 0);
        assert_eq!(game.points, 2);
        assert_eq!(game.moves.last().map(MoveRecord::kind), Some("drop"));
        assert_eq!(game.moves.last().and_then(MoveRecord::player), Some(1));
    }

    #[test]
    fn test_split_columns() {
        assert_eq!(split_columns(" 31: 6/5 8/5      41: 6/5"), ["31: 6/5 8/5", "41: 6/5"]);
        assert_eq!(split_columns("          41: 13/9"), ["", "41: 13/9"]);
        assert_eq!(split_columns("  Doubles => 2     Takes"), ["Doubles => 2", "Takes"]);
        assert_eq!(split_columns(" 64: 13/7 7/3"), ["64: 13/7 7/3", ""]);
        assert_eq!(split_columns("    Doubles => 2     Takes"), ["Doubles => 2", "Takes"]);
        assert_eq!(
            split_columns("    31: 8/5 6/5        42: 8/4 6/4"),
            ["31: 8/5 6/5", "42: 8/4 6/4"]
        );
    }

    #[test]
    fn test_indented_rows_keep_both_columns() {
        let input = " 5 point match\n Game 1\n a : 0   b : 0\n  1)    Doubles => 2        Takes\n  2)    31: 8/5 6/5        42: 8/4 6/4\n";
        let game = &parse_mat(input).unwrap().games[0];

        let records: Vec<(&str, Option<u8>)> = game
            .moves
            .iter()
            .map(|r| (r.kind(), r.player()))
            .collect();
        assert_eq!(
            records,
            vec![
                ("double", Some(0)),
                ("take", Some(1)),
                ("move", Some(0)),
                ("move", Some(1)),
            ]
        );

        let MoveRecord::Move(left) = &game.moves[2] else {
            panic!("expected checker move");
        };
        assert_eq!(left.encoded.0, [7, 4, 5, 4, -1, -1, -1, -1]);
        assert_eq!(left.move_string, "8/5 6/5");
        let MoveRecord::Move(right) = &game.moves[3] else {
            panic!("expected checker move");
        };
        assert_eq!(right.dice, [4, 2]);
        assert_eq!(right.move_string, "8/4 6/4");
    }

    #[test]
    fn test_bar_off_and_repeats() {
        let input = " 3 point match\n Game 1\n a : 0   b : 0\n  1) 66: 8/2(2) 6/off(2)     51: bar/20 6/5*\n";
        let m = parse_mat(input).unwrap();
        let MoveRecord::Move(first) = &m.games[0].moves[0] else {
            panic!("expected checker move");
        };
        assert_eq!(first.encoded.0, [7, 1, 7, 1, 5, 25, 5, 25]);
        let MoveRecord::Move(second) = &m.games[0].moves[1] else {
            panic!("expected checker move");
        };
        assert_eq!(second.player, 1);
        assert_eq!(second.encoded.0, [24, 19, 5, 4, -1, -1, -1, -1]);
    }

    #[test]
    fn test_cant_move() {
        let input = " Game 1\n a : 0   b : 0\n  1) 66: Can't move       31: 8/5 6/5\n";
        let m = parse_mat(input).unwrap();
        let MoveRecord::Move(dance) = &m.games[0].moves[0] else {
            panic!("expected checker move");
        };
        assert!(dance.encoded.is_empty());
        assert_eq!(dance.move_string, "Can't move");
    }

    #[test]
    fn test_money_game_and_crawford_game() {
        let input = " Game 1\n a : 0   b : 0\n  1) 31: 8/5 6/5\n";
        let game = &parse_mat(input).unwrap().games[0];
        assert!(game.jacoby);
        assert!(!game.crawford);
        assert_eq!(game.winner, -1);

        let input = " 5 point match\n Game 4\n a : 4   b : 2\n  1) 31: 8/5 6/5\n";
        let game = &parse_mat(input).unwrap().games[0];
        assert!(game.crawford_game);

        let input = " 5 point match\n Game 6\n a : 4   b : 4\n  1) 31: 8/5 6/5\n";
        let game = &parse_mat(input).unwrap().games[0];
        assert!(!game.crawford_game);
    }

    #[test]
    fn test_only_first_game_at_match_point_is_crawford() {
        let input = " 5 point match\n Game 4\n a : 4   b : 2\n  1) 31: 8/5 6/5\n Game 5\n a : 4   b : 3\n  1) 42: 8/4 6/4\n";
        let m = parse_mat(input).unwrap();
        assert!(m.games[0].crawford_game);
        assert!(!m.games[1].crawford_game);
        assert!(m.games[1].crawford);
    }

    #[test]
    fn test_game_header_ends_unfinished_game() {
        let input = " Game 1\n a : 0   b : 0\n  1) 31: 8/5 6/5\n Game 2\n a : 0   b : 0\n  1) 42: 8/4 6/4\n";
        let m = parse_mat(input).unwrap();
        assert_eq!(m.games.len(), 2);
        assert_eq!(m.games[0].moves.len(), 1);
        assert_eq!(m.games[1].game_number, 2);
        assert_eq!(m.games[1].moves.len(), 1);
    }

    #[test]
    fn test_player_names_drop_ratings() {
        let input = " Game 1\n alice, 1650 : 0        bob, 1700 : 0\n";
        let m = parse_mat(input).unwrap();
        assert_eq!(m.metadata.player1, "alice");
        assert_eq!(m.metadata.player2, "bob");
    }

    #[test]
    fn test_invalid_score_line() {
        let input = " Game 1\n  1) 31: 8/5 6/5\n";
        match parse_mat(input) {
            Err(Error::Flat { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("invalid score line"));
            }
            other => panic!("expected flat-format error, got {other:?}"),
        }
    }

    #[test]
    fn test_no_games_is_empty_input() {
        let err = parse_mat("; [Event \"x\"]\n 7 point match\n").unwrap_err();
        assert!(err.is_empty_input());
        assert!(parse_mat("").unwrap_err().is_empty_input());
    }

    #[test]
    fn test_bad_event_date_is_ignored() {
        let input = "; [EventDate \"2025.13.40\"]\n Game 1\n a : 0   b : 0\n";
        let m = parse_mat(input).unwrap();
        assert_eq!(m.metadata.date, None);
    }
}
