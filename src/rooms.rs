//! Room registry: named rooms, each backed by one GameSession, plus the
//! reverse index from player to room used to route moves.

use std::collections::HashMap;

use crate::game::{Color, GameSession, MoveOutcome, MoveRejection, PlayerId};

pub type RoomId = String;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateError {
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("room {0} not found")]
    NotFound(RoomId),
    #[error("room {0} is full")]
    Full(RoomId),
}

/// An accepted move, tagged with the room it was played in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMove {
    pub room_id: RoomId,
    pub outcome: MoveOutcome,
    /// Players unseated because this move ended the game. Empty otherwise.
    pub released: Vec<PlayerId>,
}

/// Owns every live room. Not thread-safe by itself: callers serialise access
/// (the hub task is the single owner in the server).
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: HashMap<RoomId, GameSession>,
    player_room: HashMap<PlayerId, RoomId>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `room_id` with `identity` seated as Black.
    ///
    /// A room that exists but has nobody seated (a reset room) is replaced.
    pub fn create_room(&mut self, room_id: &str, identity: &str) -> Result<Color, CreateError> {
        if let Some(session) = self.rooms.get(room_id) {
            if session.participant_count() > 0 {
                return Err(CreateError::AlreadyExists(room_id.to_string()));
            }
        }

        let mut session = GameSession::new();
        let color = session.assign_first_participant(identity);
        self.rooms.insert(room_id.to_string(), session);
        self.player_room
            .insert(identity.to_string(), room_id.to_string());

        tracing::info!(room_id, player_id = identity, "room created");
        Ok(color)
    }

    /// Seat `identity` as White in `room_id`, which starts the game.
    pub fn join_room(&mut self, room_id: &str, identity: &str) -> Result<Color, JoinError> {
        let session = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| JoinError::NotFound(room_id.to_string()))?;
        let color = session
            .assign_second_participant(identity)
            .ok_or_else(|| JoinError::Full(room_id.to_string()))?;
        self.player_room
            .insert(identity.to_string(), room_id.to_string());

        tracing::info!(room_id, player_id = identity, "player joined, game started");
        Ok(color)
    }

    /// Route a move to the player's room.
    ///
    /// When the move wins, the room's session is replaced with a fresh one
    /// and both players' reverse-index entries are dropped.
    pub fn submit_move(
        &mut self,
        identity: &str,
        x: i64,
        y: i64,
    ) -> Result<RoomMove, MoveRejection> {
        let room_id = self
            .player_room
            .get(identity)
            .cloned()
            .ok_or(MoveRejection::NotInRoom)?;
        let session = self
            .rooms
            .get_mut(&room_id)
            .ok_or(MoveRejection::NotInRoom)?;

        let outcome = session.place_stone(identity, x, y)?;

        let mut released = Vec::new();
        if let Some(win) = &outcome.win {
            released = session.participants().keys().cloned().collect();
            released.sort();
            for player in &released {
                if self.player_room.get(player) == Some(&room_id) {
                    self.player_room.remove(player);
                }
            }
            self.rooms.insert(room_id.clone(), GameSession::new());
            tracing::info!(
                room_id = %room_id,
                winner = ?win.color,
                total_moves = outcome.total_moves,
                "game over, room reset"
            );
        }

        Ok(RoomMove {
            room_id,
            outcome,
            released,
        })
    }

    pub fn session(&self, room_id: &str) -> Option<&GameSession> {
        self.rooms.get(room_id)
    }

    pub fn room_of(&self, identity: &str) -> Option<&str> {
        self.player_room.get(identity).map(|r| r.as_str())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
