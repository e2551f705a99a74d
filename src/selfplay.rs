//! Random-vs-random self-play through the room manager.
//!
//! Drives whole games through the same create/join/move path the server
//! uses and checks move accounting after every stone.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::{Color, MoveRejection, Point, BOARD_SIZE};
use crate::rooms::{CreateError, JoinError, RoomManager};

#[derive(Debug, thiserror::Error)]
pub enum SelfplayError {
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Join(#[from] JoinError),
    #[error("legal move was rejected: {0}")]
    Rejected(#[from] MoveRejection),
    #[error("game {game}: reported {reported} moves after placing {placed}")]
    MoveCount {
        game: usize,
        reported: u32,
        placed: usize,
    },
}

/// Aggregated results from a self-play run.
#[derive(Debug, Clone, Default)]
pub struct SelfplayResult {
    pub num_games: usize,
    pub black_wins: usize,
    pub white_wins: usize,
    /// Games that filled the board without a six.
    pub unfinished: usize,
    pub game_lengths: Vec<u32>,
    pub game_durations_ms: Vec<f64>,
}

impl SelfplayResult {
    pub fn win_rate(&self, color: Color) -> f64 {
        let wins = match color {
            Color::Black => self.black_wins,
            Color::White => self.white_wins,
        };
        wins as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_length(&self) -> f64 {
        if self.game_lengths.is_empty() {
            return 0.0;
        }
        self.game_lengths.iter().map(|&n| n as f64).sum::<f64>() / self.game_lengths.len() as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Self-play Results ({} games)", self.num_games)];
        lines.push("=".repeat(48));
        lines.push(format!(
            "  {:>10}: {:4} wins ({:5.1}%)",
            "Black",
            self.black_wins,
            self.win_rate(Color::Black) * 100.0
        ));
        lines.push(format!(
            "  {:>10}: {:4} wins ({:5.1}%)",
            "White",
            self.white_wins,
            self.win_rate(Color::White) * 100.0
        ));
        lines.push(format!("  {:>10}: {}", "Unfinished", self.unfinished));
        lines.push(format!("  Avg length: {:.1} stones", self.avg_length()));
        if !self.game_durations_ms.is_empty() {
            let total_ms: f64 = self.game_durations_ms.iter().sum();
            lines.push(format!(
                "  Avg game: {:.2}ms  |  Total: {:.2}s",
                total_ms / self.game_durations_ms.len() as f64,
                total_ms / 1000.0
            ));
        }
        lines.join("\n")
    }
}

/// Play `num_games` random games and return aggregated stats.
pub fn run_selfplay(
    num_games: usize,
    seed: u64,
    progress_callback: Option<&dyn Fn(usize, usize)>,
) -> Result<SelfplayResult, SelfplayError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rooms = RoomManager::new();
    let mut result = SelfplayResult {
        num_games,
        ..Default::default()
    };

    for game in 0..num_games {
        let t0 = Instant::now();
        let room_id = format!("selfplay-{game}");
        let black = format!("black-{game}");
        let white = format!("white-{game}");
        rooms.create_room(&room_id, &black)?;
        rooms.join_room(&room_id, &white)?;

        let mut empty: Vec<Point> = (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| Point::new(x, y)))
            .collect();
        let mut to_move = Color::Black;
        let mut placed = 0usize;
        let mut winner = None;

        while !empty.is_empty() {
            let idx = rng.gen_range(0..empty.len());
            let point = empty.swap_remove(idx);
            let player = match to_move {
                Color::Black => &black,
                Color::White => &white,
            };
            let room_move = rooms.submit_move(player, point.x as i64, point.y as i64)?;
            placed += 1;

            let outcome = room_move.outcome;
            if outcome.total_moves as usize != placed {
                return Err(SelfplayError::MoveCount {
                    game,
                    reported: outcome.total_moves,
                    placed,
                });
            }
            if let Some(win) = outcome.win {
                winner = Some(win.color);
                break;
            }
            to_move = outcome.current_color;
        }

        match winner {
            Some(Color::Black) => result.black_wins += 1,
            Some(Color::White) => result.white_wins += 1,
            None => result.unfinished += 1,
        }
        result.game_lengths.push(placed as u32);
        result
            .game_durations_ms
            .push(t0.elapsed().as_secs_f64() * 1000.0);

        if let Some(cb) = progress_callback {
            cb(game + 1, num_games);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selfplay_accounts_for_every_game() {
        let result = run_selfplay(5, 42, None).unwrap();
        assert_eq!(result.num_games, 5);
        assert_eq!(result.black_wins + result.white_wins + result.unfinished, 5);
        assert_eq!(result.game_lengths.len(), 5);
        assert!(result
            .game_lengths
            .iter()
            .all(|&n| n >= 11 && n as usize <= BOARD_SIZE * BOARD_SIZE));
    }

    #[test]
    fn test_selfplay_is_deterministic_per_seed() {
        let a = run_selfplay(3, 7, None).unwrap();
        let b = run_selfplay(3, 7, None).unwrap();
        assert_eq!(a.game_lengths, b.game_lengths);
        assert_eq!(a.black_wins, b.black_wins);
    }

    #[test]
    fn test_progress_callback_counts_up() {
        use std::cell::RefCell;
        let seen = RefCell::new(Vec::new());
        run_selfplay(3, 1, Some(&|done, total| seen.borrow_mut().push((done, total)))).unwrap();
        assert_eq!(seen.into_inner(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_summary_mentions_both_colors() {
        let result = run_selfplay(2, 3, None).unwrap();
        let text = result.summary();
        assert!(text.contains("Black"));
        assert!(text.contains("White"));
        assert!(text.contains("(2 games)"));
    }
}
