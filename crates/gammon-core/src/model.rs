//! Unified match model shared by both input formats.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::points::MoveEncoding;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub metadata: MatchMetadata,
    pub games: Vec<Game>,
}

impl Match {
    /// Pretty-printed JSON, fields in declaration order.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_compact(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMetadata {
    pub player1: String,
    pub player2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating2: Option<String>,
    /// Points to play to; 0 for a money game.
    pub match_length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    /// ISO `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Recording application, e.g. "GNU Backgammon:1.06.002"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
}

impl MatchMetadata {
    pub fn is_money_game(&self) -> bool {
        self.match_length == 0
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variation {
    #[default]
    Standard,
    Nackgammon,
    Hypergammon1,
    Hypergammon2,
    Hypergammon3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_number: u32,
    /// Score before this game, [player1, player2]
    pub score: [u32; 2],
    pub variation: Variation,
    /// Crawford rule in effect
    pub crawford: bool,
    /// This is the Crawford game
    pub crawford_game: bool,
    pub jacoby: bool,
    pub cube_enabled: bool,
    pub auto_doubles: u32,
    /// 0 = player1, 1 = player2, -1 = not finished
    pub winner: i8,
    pub points: u32,
    pub resigned: bool,
    pub moves: Vec<MoveRecord>,
}

impl Default for Game {
    fn default() -> Self {
        Self {
            game_number: 0,
            score: [0, 0],
            variation: Variation::Standard,
            crawford: false,
            crawford_game: false,
            jacoby: false,
            cube_enabled: true,
            auto_doubles: 0,
            winner: -1,
            points: 0,
            resigned: false,
            moves: Vec::new(),
        }
    }
}

/// One replayable event in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveRecord {
    Move(CheckerMove),
    Double(CubeAction),
    Take(CubeAction),
    Drop(CubeAction),
    SetBoard(BoardSetup),
    SetDice(DiceSet),
    SetCube(CubeValueSet),
    SetCubePos(CubeOwnerSet),
}

impl MoveRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            MoveRecord::Move(_) => "move",
            MoveRecord::Double(_) => "double",
            MoveRecord::Take(_) => "take",
            MoveRecord::Drop(_) => "drop",
            MoveRecord::SetBoard(_) => "set_board",
            MoveRecord::SetDice(_) => "set_dice",
            MoveRecord::SetCube(_) => "set_cube",
            MoveRecord::SetCubePos(_) => "set_cube_pos",
        }
    }

    /// Acting side for moves and cube actions.
    pub fn player(&self) -> Option<u8> {
        match self {
            MoveRecord::Move(m) => Some(m.player),
            MoveRecord::Double(c) | MoveRecord::Take(c) | MoveRecord::Drop(c) => Some(c.player),
            _ => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            MoveRecord::Move(m) => m.notes.comment.as_deref(),
            MoveRecord::Double(c) | MoveRecord::Take(c) | MoveRecord::Drop(c) => {
                c.notes.comment.as_deref()
            }
            MoveRecord::SetBoard(b) => b.comment.as_deref(),
            MoveRecord::SetDice(d) => d.comment.as_deref(),
            MoveRecord::SetCube(c) => c.comment.as_deref(),
            MoveRecord::SetCubePos(c) => c.comment.as_deref(),
        }
    }
}

/// Analysis and commentary attached to a move or cube action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MoveAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cube_analysis: Option<CubeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luck: Option<Luck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<Skill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerMove {
    pub player: u8,
    pub dice: [u8; 2],
    #[serde(rename = "move")]
    pub encoded: MoveEncoding,
    pub move_string: String,
    #[serde(flatten)]
    pub notes: Annotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeAction {
    pub player: u8,
    /// Cube value after the double, when the source records it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cube_value: Option<u32>,
    #[serde(flatten)]
    pub notes: Annotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSetup {
    pub position: BoardSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Checker counts per side; index 0..=23 are points, 24 is the bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: [[u8; 25]; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_roll: Option<u8>,
}

impl BoardSnapshot {
    pub fn checkers(&self, side: usize) -> u32 {
        self.board[side].iter().map(|&n| u32::from(n)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceSet {
    pub dice: [u8; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luck: Option<Luck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeValueSet {
    pub cube_value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CubeOwner {
    Center,
    Player1,
    Player2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeOwnerSet {
    pub owner: CubeOwner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveAnalysis {
    pub moves: Vec<MoveOption>,
    /// Index into `moves` of the move actually played
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_move: Option<usize>,
}

/// One candidate move and its evaluation, from the mover's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOption {
    #[serde(rename = "move")]
    pub encoded: MoveEncoding,
    pub move_string: String,
    pub equity: f64,
    pub win: f32,
    pub gammon: f32,
    pub backgammon: f32,
    pub opponent_win: f32,
    pub opponent_gammon: f32,
    pub opponent_backgammon: f32,
    /// Search depth in plies (0 = book / static)
    pub analysis_depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BestAction {
    Double,
    NoDouble,
    Take,
    Pass,
    /// The equities needed for the comparison were not recorded.
    Indeterminate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeAnalysis {
    pub win: f32,
    pub gammon: f32,
    pub backgammon: f32,
    pub opponent_win: f32,
    pub opponent_gammon: f32,
    pub cubeless_equity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cubeful_no_double: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cubeful_double_take: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cubeful_double_pass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_action: Option<BestAction>,
    pub analysis_depth: u32,
}

/// Luck of a roll: tag such as "VeryGood" plus the equity swing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Luck {
    pub rating: String,
    pub value: f64,
}

/// Quality of a decision: tag such as "Doubtful" plus the equity lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub rating: String,
    pub error: f64,
}
