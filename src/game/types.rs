//! Domain types for the six-in-a-row game.

pub type PlayerId = String;

/// Board edge length.
pub const BOARD_SIZE: usize = 19;

/// Contiguous stones needed to win.
pub const WIN_LENGTH: usize = 6;

/// Stones a side places per turn, except Black's opening turn.
pub const STONES_PER_TURN: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Wire representation: 1=Black, 2=White.
    pub fn number(self) -> u8 {
        match self {
            Color::Black => 1,
            Color::White => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Stone(Color),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A finished game: the winning color and its line, ordered from the
/// negative end of the scan direction to the positive end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Win {
    pub color: Color,
    pub line: Vec<Point>,
}

/// Result of an accepted stone placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub point: Point,
    /// Color that placed the stone.
    pub color: Color,
    /// Color to move next. Equal to `color` when the move won.
    pub current_color: Color,
    pub total_moves: u32,
    pub turn_moves: u32,
    pub win: Option<Win>,
}

/// Why a placement was refused. A refused move never touches the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejection {
    #[error("player is not seated in any room")]
    NotInRoom,
    #[error("game has not started")]
    NotStarted,
    #[error("player is not part of this game")]
    NotParticipant,
    #[error("not this player's turn")]
    NotYourTurn,
    #[error("coordinates are off the board")]
    OutOfBounds,
    #[error("cell is already occupied")]
    Occupied,
}

impl MoveRejection {
    /// Stable snake_case code sent to clients.
    pub fn code(self) -> &'static str {
        match self {
            MoveRejection::NotInRoom => "not_in_room",
            MoveRejection::NotStarted => "not_started",
            MoveRejection::NotParticipant => "not_participant",
            MoveRejection::NotYourTurn => "not_your_turn",
            MoveRejection::OutOfBounds => "out_of_bounds",
            MoveRejection::Occupied => "occupied",
        }
    }
}
