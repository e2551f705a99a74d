//! Wire events exchanged with clients.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": {...}}`.
//! Payload fields are camelCase; colors travel as numbers (1=Black, 2=White).

use serde::{Deserialize, Serialize};

use crate::game::{Color, MoveOutcome, MoveRejection, Win};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub room_id: String,
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub player_id: String,
    pub x: i64,
    pub y: i64,
}

/// Inbound events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    CreateRoom(RoomRequest),
    JoinRoom(RoomRequest),
    Move(MoveRequest),
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: String,
    pub color_number: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoined {
    pub player_id: String,
    pub color_number: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    pub current_color: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMade {
    pub x: usize,
    pub y: usize,
    pub color: u8,
    pub current_color: u8,
    pub total_moves: u32,
    pub turn_moves: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOver {
    pub winner_color: u8,
    pub win_line: Vec<[usize; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRejected {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// Outbound events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomCreated(RoomCreated),
    RoomExists(RoomRef),
    RoomNotFound(RoomRef),
    RoomFull(RoomRef),
    PlayerJoined(PlayerJoined),
    GameStart(GameStart),
    MoveMade(MoveMade),
    GameOver(GameOver),
    MoveRejected(MoveRejected),
    Error(ErrorMessage),
}

impl ServerEvent {
    pub fn room_created(room_id: &str, color: Color) -> Self {
        ServerEvent::RoomCreated(RoomCreated {
            room_id: room_id.to_string(),
            color_number: color.number(),
        })
    }

    pub fn player_joined(player_id: &str, color: Color) -> Self {
        ServerEvent::PlayerJoined(PlayerJoined {
            player_id: player_id.to_string(),
            color_number: color.number(),
        })
    }

    pub fn game_start(current: Color) -> Self {
        ServerEvent::GameStart(GameStart {
            current_color: current.number(),
        })
    }

    pub fn move_made(outcome: &MoveOutcome) -> Self {
        ServerEvent::MoveMade(MoveMade {
            x: outcome.point.x,
            y: outcome.point.y,
            color: outcome.color.number(),
            current_color: outcome.current_color.number(),
            total_moves: outcome.total_moves,
            turn_moves: outcome.turn_moves,
        })
    }

    pub fn game_over(win: &Win) -> Self {
        ServerEvent::GameOver(GameOver {
            winner_color: win.color.number(),
            win_line: win.line.iter().map(|p| [p.x, p.y]).collect(),
        })
    }

    pub fn move_rejected(reason: MoveRejection) -> Self {
        ServerEvent::MoveRejected(MoveRejected {
            reason: reason.code().to_string(),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorMessage {
            message: message.into(),
        })
    }

    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
