//! Human-readable match overview.

use std::fmt;

use gammon_core::model::{Match, MoveRecord, Variation};

pub struct Summary<'a>(pub &'a Match);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = &self.0.metadata;

        writeln!(f, "=== Match Summary ===")?;
        writeln!(f, "Players: {} vs {}", meta.player1, meta.player2)?;
        if meta.rating1.is_some() || meta.rating2.is_some() {
            writeln!(
                f,
                "Ratings: {} vs {}",
                meta.rating1.as_deref().unwrap_or(""),
                meta.rating2.as_deref().unwrap_or("")
            )?;
        }
        if meta.is_money_game() {
            writeln!(f, "Match Type: Money game")?;
        } else {
            writeln!(f, "Match Length: {} points", meta.match_length)?;
        }

        let optional = [
            ("Event", &meta.event),
            ("Round", &meta.round),
            ("Location", &meta.place),
            ("Date", &meta.date),
            ("Application", &meta.application),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                writeln!(f, "{label}: {value}")?;
            }
        }

        writeln!(f, "\nGames: {}", self.0.games.len())?;

        for (i, game) in self.0.games.iter().enumerate() {
            writeln!(f, "\n--- Game {} ---", i + 1)?;
            writeln!(f, "Score: {}-{}", game.score[0], game.score[1])?;
            writeln!(f, "Moves: {}", game.moves.len())?;

            if game.winner >= 0 {
                let winner = if game.winner == 1 {
                    &meta.player2
                } else {
                    &meta.player1
                };
                write!(f, "Winner: {winner}")?;
                if game.points > 0 {
                    write!(f, " ({} points)", game.points)?;
                }
                if game.resigned {
                    write!(f, " - Resigned")?;
                }
                writeln!(f)?;
            }

            if game.crawford {
                writeln!(f, "Crawford rule: enabled")?;
            }
            if game.crawford_game {
                writeln!(f, "This is the Crawford game")?;
            }
            if game.jacoby {
                writeln!(f, "Jacoby rule: enabled")?;
            }
            if !game.cube_enabled {
                writeln!(f, "Cube: disabled")?;
            }
            if game.variation != Variation::Standard {
                writeln!(f, "Variation: {:?}", game.variation)?;
            }

            let count = |pred: fn(&MoveRecord) -> bool| game.moves.iter().filter(|r| pred(r)).count();
            let checker = count(|r| matches!(r, MoveRecord::Move(_)));
            let doubles = count(|r| matches!(r, MoveRecord::Double(_)));
            let takes = count(|r| matches!(r, MoveRecord::Take(_)));
            let drops = count(|r| matches!(r, MoveRecord::Drop(_)));

            if checker > 0 {
                writeln!(f, "Checker moves: {checker}")?;
            }
            if doubles > 0 {
                writeln!(f, "Doubles: {doubles} (Takes: {takes}, Drops: {drops})")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_sgf_match() {
        let m = gammon_core::parse_sgf(
            "(;PW[alice]PB[bob]WR[1650]EV[Open]MI[length:5][game:1][ws:0][bs:0]\
             RU[Crawford:Nackgammon]RE[B+2R];W[31hegf];B[double];W[take];B[52lpab])",
        )
        .unwrap();
        let text = Summary(&m).to_string();

        assert!(text.starts_with("=== Match Summary ===\nPlayers: alice vs bob\n"));
        assert!(text.contains("Ratings: 1650 vs \n"));
        assert!(text.contains("Match Length: 5 points\n"));
        assert!(text.contains("Event: Open\n"));
        assert!(!text.contains("Round:"));
        assert!(text.contains("\nGames: 1\n"));
        assert!(text.contains("--- Game 1 ---\nScore: 0-0\nMoves: 4\n"));
        assert!(text.contains("Winner: bob (2 points) - Resigned\n"));
        assert!(text.contains("Crawford rule: enabled\n"));
        assert!(text.contains("Variation: Nackgammon\n"));
        assert!(text.contains("Checker moves: 2\n"));
        assert!(text.contains("Doubles: 1 (Takes: 1, Drops: 0)\n"));
    }

    #[test]
    fn test_summary_of_money_game() {
        let m = gammon_core::parse_mat(" Game 1\n a : 0   b : 0\n  1) 31: 8/5 6/5\n").unwrap();
        let text = Summary(&m).to_string();
        assert!(text.contains("Match Type: Money game\n"));
        assert!(text.contains("Jacoby rule: enabled\n"));
        assert!(!text.contains("Winner:"));
    }
}
