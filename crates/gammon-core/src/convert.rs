//! Conversion from parsed game trees to the unified match model.
//!
//! Each game tree becomes one [`Game`]. Its root node carries match and
//! game metadata; every node in the chain (root included) is classified into
//! at most one [`MoveRecord`].

use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::Error;
use crate::model::{
    Annotations, BestAction, BoardSetup, BoardSnapshot, CheckerMove, CubeAction, CubeAnalysis,
    CubeOwner, CubeOwnerSet, CubeValueSet, DiceSet, Game, Luck, Match, MatchMetadata,
    MoveAnalysis, MoveOption, MoveRecord, Skill, Variation,
};
use crate::points::{point_from_letter, MoveEncoding, BAR};
use crate::sgf::{GameTree, Node};

#[derive(Debug, Clone, Copy)]
enum MetadataField {
    Application,
    Player1,
    Player2,
    Rating1,
    Rating2,
    Event,
    Round,
    Place,
    Date,
    Annotator,
    Comment,
}

/// Root-node property → match metadata field.
const METADATA_TAGS: [(&str, MetadataField); 11] = [
    ("AP", MetadataField::Application),
    ("PW", MetadataField::Player1),
    ("PB", MetadataField::Player2),
    ("WR", MetadataField::Rating1),
    ("BR", MetadataField::Rating2),
    ("EV", MetadataField::Event),
    ("RO", MetadataField::Round),
    ("PC", MetadataField::Place),
    ("DT", MetadataField::Date),
    ("AN", MetadataField::Annotator),
    ("GC", MetadataField::Comment),
];

#[derive(Debug, Clone, Copy)]
enum Rule {
    Crawford,
    CrawfordGame,
    Jacoby,
    NoCube,
    Variant(Variation),
}

/// Tokens of the colon-separated `RU` property.
const RULE_TOKENS: [(&str, Rule); 8] = [
    ("Crawford", Rule::Crawford),
    ("CrawfordGame", Rule::CrawfordGame),
    ("Jacoby", Rule::Jacoby),
    ("NoCube", Rule::NoCube),
    ("Nackgammon", Rule::Variant(Variation::Nackgammon)),
    ("Hypergammon1", Rule::Variant(Variation::Hypergammon1)),
    ("Hypergammon2", Rule::Variant(Variation::Hypergammon2)),
    ("Hypergammon3", Rule::Variant(Variation::Hypergammon3)),
];

/// Minimum whitespace tokens in one move-evaluation row.
const MOVE_ROW_TOKENS: usize = 10;
/// Minimum whitespace tokens in a cube-decision row.
const CUBE_ROW_TOKENS: usize = 13;
/// A cube row this long also carries the cubeful no-double equity.
const CUBE_ROW_CUBEFUL_TOKENS: usize = 16;

/// Which cube decision an analysis belongs to, for best-action inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CubeDecision {
    Offer,
    Response,
}

/// Convert every game tree into one match, one game per tree.
pub fn convert_trees(trees: &[GameTree]) -> Result<Match, Error> {
    if trees.is_empty() {
        return Err(Error::Empty("no game trees found"));
    }

    let mut metadata = MatchMetadata::default();
    let mut games = Vec::with_capacity(trees.len());

    for tree in trees {
        let Some(root) = tree.root() else {
            continue;
        };
        let game = convert_game(tree, root, &mut metadata);
        debug!(
            game_number = game.game_number,
            records = game.moves.len(),
            "converted game"
        );
        games.push(game);
    }

    if games.is_empty() {
        return Err(Error::Empty("no games found"));
    }

    Ok(Match { metadata, games })
}

fn convert_game(tree: &GameTree, root: &Node, metadata: &mut MatchMetadata) -> Game {
    let mut game = Game::default();

    extract_metadata(root, metadata);
    for value in root.values("MI").unwrap_or_default() {
        parse_match_info(value, metadata, &mut game);
    }
    if let Some(ru) = root.first("RU") {
        parse_rules(ru, &mut game);
    }
    if let Some(cv) = root.first("CV") {
        game.auto_doubles = number(cv);
    }
    if let Some(re) = root.first("RE") {
        parse_result(re, &mut game);
    }

    game.moves = tree.nodes.iter().filter_map(convert_node).collect();
    game
}

fn extract_metadata(root: &Node, metadata: &mut MatchMetadata) {
    for (tag, field) in METADATA_TAGS {
        let Some(value) = root.first(tag).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = value.to_string();
        match field {
            MetadataField::Application => metadata.application = Some(value),
            MetadataField::Player1 => metadata.player1 = value,
            MetadataField::Player2 => metadata.player2 = value,
            MetadataField::Rating1 => metadata.rating1 = Some(value),
            MetadataField::Rating2 => metadata.rating2 = Some(value),
            MetadataField::Event => metadata.event = Some(value),
            MetadataField::Round => metadata.round = Some(value),
            MetadataField::Place => metadata.place = Some(value),
            MetadataField::Date => metadata.date = Some(value),
            MetadataField::Annotator => metadata.annotator = Some(value),
            MetadataField::Comment => metadata.comment = Some(value),
        }
    }
}

/// `MI` composite: `[length:7][game:1][ws:0][bs:0]`. The pieces arrive
/// either as separate property values or as one joined string.
pub fn parse_match_info(mi: &str, metadata: &mut MatchMetadata, game: &mut Game) {
    for part in mi.split("][") {
        let part = part.trim_matches(|c| c == '[' || c == ']');
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let Ok(value) = value.trim().parse::<u32>() else {
            continue;
        };
        match key.trim() {
            "length" => metadata.match_length = value,
            "game" => game.game_number = value,
            "ws" => game.score[0] = value,
            "bs" => game.score[1] = value,
            _ => {}
        }
    }
}

/// `RU` composite: `Crawford:CrawfordGame:Jacoby:Nackgammon`.
pub fn parse_rules(ru: &str, game: &mut Game) {
    for token in ru.split(':').map(str::trim) {
        let Some(&(_, rule)) = RULE_TOKENS.iter().find(|(name, _)| *name == token) else {
            continue;
        };
        match rule {
            Rule::Crawford => game.crawford = true,
            Rule::CrawfordGame => game.crawford_game = true,
            Rule::Jacoby => game.jacoby = true,
            Rule::NoCube => game.cube_enabled = false,
            Rule::Variant(variation) => game.variation = variation,
        }
    }
}

/// `RE` value: `W+2`, `B+1R` (trailing `R` = resigned).
pub fn parse_result(re: &str, game: &mut Game) {
    if re.len() < 3 {
        return;
    }
    let Some(rest) = re.get(1..) else {
        return;
    };

    match re.chars().next() {
        Some('W') => game.winner = 0,
        Some('B') => game.winner = 1,
        _ => {}
    }

    let points = rest.trim_start_matches('+').trim_end_matches('R');
    if let Ok(points) = points.parse() {
        game.points = points;
    }
    game.resigned = re.ends_with('R');
}

/// Classify one node. First match wins: checker move, board setup, cube
/// value, cube owner, dice.
fn convert_node(node: &Node) -> Option<MoveRecord> {
    let comment = node
        .first("C")
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let mover = node
        .first("B")
        .filter(|v| !v.is_empty())
        .map(|v| (1u8, v))
        .or_else(|| node.first("W").filter(|v| !v.is_empty()).map(|v| (0u8, v)));
    if let Some((player, value)) = mover {
        return Some(convert_move(node, player, value, comment));
    }

    if node.has("AE") || node.has("AW") || node.has("AB") {
        return Some(MoveRecord::SetBoard(BoardSetup {
            position: board_snapshot(node),
            comment,
        }));
    }

    if let Some(cv) = node.first("CV") {
        return Some(MoveRecord::SetCube(CubeValueSet {
            cube_value: number(cv),
            comment,
        }));
    }

    if let Some(cp) = node.first("CP") {
        let owner = match cp.trim() {
            "c" => CubeOwner::Center,
            "w" => CubeOwner::Player1,
            "b" => CubeOwner::Player2,
            other => {
                warn!(value = other, "unknown cube owner code, assuming center");
                CubeOwner::Center
            }
        };
        return Some(MoveRecord::SetCubePos(CubeOwnerSet { owner, comment }));
    }

    if let Some(di) = node.first("DI").filter(|d| d.chars().count() >= 2) {
        return Some(MoveRecord::SetDice(DiceSet {
            dice: dice(di),
            luck: node.first("LU").and_then(rating).map(|(rating, value)| Luck { rating, value }),
            comment,
        }));
    }

    None
}

fn convert_move(node: &Node, player: u8, value: &str, comment: Option<String>) -> MoveRecord {
    let decision = match value {
        "double" => Some(CubeDecision::Offer),
        "take" | "drop" | "pass" => Some(CubeDecision::Response),
        _ => None,
    };

    let notes = Annotations {
        analysis: node
            .values("A")
            .and_then(|rows| decode_move_analysis(rows, player)),
        cube_analysis: node
            .values("DA")
            .and_then(|rows| decode_cube_analysis(rows, decision)),
        luck: node
            .first("LU")
            .and_then(rating)
            .map(|(rating, value)| Luck { rating, value }),
        skill: node
            .first("SK")
            .and_then(rating)
            .map(|(rating, error)| Skill { rating, error }),
        comment,
    };

    let action = |notes| CubeAction {
        player,
        cube_value: None,
        notes,
    };
    match value {
        "double" => MoveRecord::Double(action(notes)),
        "take" => MoveRecord::Take(action(notes)),
        "drop" | "pass" => MoveRecord::Drop(action(notes)),
        _ => MoveRecord::Move(checker_move(player, value, notes)),
    }
}

/// `52lpab`: two die faces, then from/to point letters.
fn checker_move(player: u8, value: &str, mut notes: Annotations) -> CheckerMove {
    let (dice_part, code) = match value.char_indices().nth(2) {
        Some((idx, _)) => value.split_at(idx),
        None => (value, ""),
    };
    let encoded = MoveEncoding::from_letters(code);

    if let Some(analysis) = notes.analysis.as_mut() {
        analysis.selected_move = analysis.moves.iter().position(|o| o.encoded == encoded);
    }

    CheckerMove {
        player,
        dice: dice(dice_part),
        encoded,
        move_string: encoded.render(player),
        notes,
    }
}

fn dice(value: &str) -> [u8; 2] {
    let mut faces = value.chars().map(|ch| match ch.to_digit(10) {
        Some(d @ 1..=6) => d as u8,
        _ => {
            debug!(value, "unreadable die face");
            0
        }
    });
    [faces.next().unwrap_or(0), faces.next().unwrap_or(0)]
}

/// `A` rows. An optional leading bare integer is the shared search depth.
fn decode_move_analysis(rows: &[String], player: u8) -> Option<MoveAnalysis> {
    let (depth, rows) = match rows.split_first() {
        Some((first, rest)) => match first.trim().parse::<u32>() {
            Ok(depth) => (depth, rest),
            Err(_) => (0, rows),
        },
        None => return None,
    };

    let moves: Vec<MoveOption> = rows
        .iter()
        .filter_map(|row| decode_move_option(row, depth, player))
        .collect();

    if moves.is_empty() {
        return None;
    }
    Some(MoveAnalysis {
        moves,
        selected_move: None,
    })
}

/// One candidate row:
/// `move quality ver version win gammon backgammon opp_gammon opp_backgammon equity ...`
pub fn decode_move_option(row: &str, depth: u32, player: u8) -> Option<MoveOption> {
    let tokens: Vec<&str> = row.split_whitespace().collect();
    if tokens.len() < MOVE_ROW_TOKENS {
        return None;
    }

    let encoded = MoveEncoding::from_letters(tokens[0]);
    let win: f32 = number(tokens[4]);

    Some(MoveOption {
        encoded,
        move_string: encoded.render(player),
        equity: number(tokens[9]),
        win,
        gammon: number(tokens[5]),
        backgammon: number(tokens[6]),
        // not stored: winning and losing are complementary
        opponent_win: 1.0 - win,
        opponent_gammon: number(tokens[7]),
        opponent_backgammon: number(tokens[8]),
        analysis_depth: depth,
    })
}

/// First `DA` row:
/// `quality ver version cube_state _ _ _ win opp_win opp_gammon gammon backgammon cubeless [no_double ...]`
fn decode_cube_analysis(rows: &[String], decision: Option<CubeDecision>) -> Option<CubeAnalysis> {
    let tokens: Vec<&str> = rows.first()?.split_whitespace().collect();
    if tokens.len() < CUBE_ROW_TOKENS {
        return None;
    }

    let mut analysis = CubeAnalysis {
        win: number(tokens[7]),
        opponent_win: number(tokens[8]),
        opponent_gammon: number(tokens[9]),
        gammon: number(tokens[10]),
        backgammon: number(tokens[11]),
        cubeless_equity: number(tokens[12]),
        cubeful_no_double: (tokens.len() >= CUBE_ROW_CUBEFUL_TOKENS).then(|| number(tokens[13])),
        cubeful_double_take: None,
        cubeful_double_pass: None,
        best_action: None,
        analysis_depth: leading_number(tokens[3]),
    };
    analysis.best_action = decision.map(|d| best_action(d, &analysis));
    Some(analysis)
}

/// Compare the cubeful equities the decision depends on. Missing equities
/// give [`BestAction::Indeterminate`].
fn best_action(decision: CubeDecision, analysis: &CubeAnalysis) -> BestAction {
    match decision {
        CubeDecision::Offer => match (analysis.cubeful_double_take, analysis.cubeful_no_double) {
            (Some(take), Some(no_double)) if take > no_double => BestAction::Double,
            (Some(_), Some(_)) => BestAction::NoDouble,
            _ => BestAction::Indeterminate,
        },
        CubeDecision::Response => {
            match (analysis.cubeful_double_take, analysis.cubeful_double_pass) {
                (Some(take), Some(pass)) if take > pass => BestAction::Take,
                (Some(_), Some(_)) => BestAction::Pass,
                _ => BestAction::Indeterminate,
            }
        }
    }
}

/// `LU` / `SK`: tag and magnitude.
fn rating(value: &str) -> Option<(String, f64)> {
    let mut tokens = value.split_whitespace();
    let tag = tokens.next()?;
    let magnitude = tokens.next()?;
    Some((tag.to_string(), number(magnitude)))
}

/// `AW` / `AB` one-letter point lists and the `PL` on-roll code.
fn board_snapshot(node: &Node) -> BoardSnapshot {
    let mut snapshot = BoardSnapshot::default();

    for (side, property) in [(0usize, "AW"), (1usize, "AB")] {
        for value in node.values(property).unwrap_or_default() {
            let mut chars = value.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                debug!(property, value = %value, "skipping multi-character board point");
                continue;
            };
            match point_from_letter(ch) {
                Some(point) if point <= BAR => {
                    let slot = &mut snapshot.board[side][point as usize];
                    *slot = slot.saturating_add(1);
                }
                _ => debug!(property, value = %value, "skipping board point"),
            }
        }
    }

    snapshot.on_roll = node
        .first("PL")
        .map(|pl| if pl == "W" || pl == "w" { 0 } else { 1 });
    snapshot
}

/// Parse a numeric sub-field; unparseable input is zero.
fn number<T: FromStr + Default>(token: &str) -> T {
    token.trim().parse().unwrap_or_else(|_| {
        debug!(token, "unparseable number, using zero");
        T::default()
    })
}

/// Leading digits of a token such as `2C`.
fn leading_number(token: &str) -> u32 {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    token[..end].parse().unwrap_or(0)
}
