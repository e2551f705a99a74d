//! GameSession: one game's board, seats and turn state.
//!
//! The session is a pure state machine. It knows nothing about rooms or
//! connections; callers feed it identities and coordinates and act on the
//! returned outcome.

use std::collections::HashMap;

use super::board::Board;
use super::types::{
    Cell, Color, MoveOutcome, MoveRejection, PlayerId, Point, Win, STONES_PER_TURN,
};

#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current_color: Color,
    total_moves: u32,
    turn_moves: u32,
    participants: HashMap<PlayerId, Color>,
    started: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_color: Color::Black,
            total_moves: 0,
            turn_moves: 0,
            participants: HashMap::new(),
            started: false,
        }
    }

    /// Seat the room creator as Black.
    pub fn assign_first_participant(&mut self, identity: &str) -> Color {
        self.participants.insert(identity.to_string(), Color::Black);
        Color::Black
    }

    /// Seat the second player as White and start the game.
    ///
    /// Returns None when both seats are taken, the identity is already
    /// seated, or the game has already started.
    pub fn assign_second_participant(&mut self, identity: &str) -> Option<Color> {
        if self.started || self.participants.len() >= 2 || self.participants.contains_key(identity)
        {
            return None;
        }
        self.participants.insert(identity.to_string(), Color::White);
        self.started = true;
        Some(Color::White)
    }

    /// Place a stone for `identity` at (x, y).
    ///
    /// Preconditions are checked in order (started, seated, on turn, on the
    /// board, empty cell); the first failure is returned and the session is
    /// left untouched.
    pub fn place_stone(
        &mut self,
        identity: &str,
        x: i64,
        y: i64,
    ) -> Result<MoveOutcome, MoveRejection> {
        if !self.started {
            return Err(MoveRejection::NotStarted);
        }
        let color = *self
            .participants
            .get(identity)
            .ok_or(MoveRejection::NotParticipant)?;
        if color != self.current_color {
            return Err(MoveRejection::NotYourTurn);
        }
        let point = Board::point(x, y).ok_or(MoveRejection::OutOfBounds)?;
        if !self.board.place(point, color) {
            return Err(MoveRejection::Occupied);
        }

        self.total_moves += 1;
        self.turn_moves += 1;

        // Win check happens before the turn advances.
        if let Some(line) = self.board.find_win_line(point, color) {
            return Ok(MoveOutcome {
                point,
                color,
                current_color: color,
                total_moves: self.total_moves,
                turn_moves: self.turn_moves,
                win: Some(Win { color, line }),
            });
        }

        // Black opens with a single stone; every later turn is two.
        if self.total_moves == 1 || self.turn_moves >= STONES_PER_TURN {
            self.current_color = color.opponent();
            self.turn_moves = 0;
        }

        Ok(MoveOutcome {
            point,
            color,
            current_color: self.current_color,
            total_moves: self.total_moves,
            turn_moves: self.turn_moves,
            win: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, point: Point) -> Cell {
        self.board.cell(point)
    }

    pub fn current_color(&self) -> Color {
        self.current_color
    }

    pub fn total_moves(&self) -> u32 {
        self.total_moves
    }

    pub fn turn_moves(&self) -> u32 {
        self.turn_moves
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn participants(&self) -> &HashMap<PlayerId, Color> {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn color_of(&self, identity: &str) -> Option<Color> {
        self.participants.get(identity).copied()
    }

    pub fn stone_count(&self) -> usize {
        self.board.stone_count()
    }
}
