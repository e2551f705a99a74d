//! The hub: single owner of all room state.
//!
//! Connections talk to the hub over a channel and the hub processes
//! commands one at a time, so every create/join/move runs to completion
//! before the next one starts. Outbound events go to per-connection
//! unbounded senders.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::game::Color;
use crate::protocol::{ClientEvent, MoveRequest, RoomRef, RoomRequest, ServerEvent};
use crate::rooms::{JoinError, RoomId, RoomManager};

pub type ConnId = u64;
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

const COMMAND_QUEUE: usize = 1024;

#[derive(Debug)]
pub enum HubCommand {
    Connect { conn: ConnId, sender: EventSender },
    Request { conn: ConnId, event: ClientEvent },
    Disconnect { conn: ConnId },
}

/// Cloneable handle used by connection tasks to reach the hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Returns false once the hub has shut down.
    pub async fn send(&self, cmd: HubCommand) -> bool {
        self.tx.send(cmd).await.is_ok()
    }
}

pub struct Hub {
    rooms: RoomManager,
    connections: HashMap<ConnId, EventSender>,
    /// Connections that receive room-wide broadcasts, per room.
    subscribers: HashMap<RoomId, HashSet<ConnId>>,
}

impl Hub {
    pub fn new(rooms: RoomManager) -> Self {
        Self {
            rooms,
            connections: HashMap::new(),
            subscribers: HashMap::new(),
        }
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Connect { conn, sender } => {
                self.connections.insert(conn, sender);
            }
            HubCommand::Disconnect { conn } => {
                self.connections.remove(&conn);
                self.subscribers.retain(|_, subs| {
                    subs.remove(&conn);
                    !subs.is_empty()
                });
            }
            HubCommand::Request { conn, event } => match event {
                ClientEvent::CreateRoom(req) => self.create_room(conn, req),
                ClientEvent::JoinRoom(req) => self.join_room(conn, req),
                ClientEvent::Move(req) => self.submit_move(conn, req),
            },
        }
    }

    /// Process commands until every handle is dropped.
    pub async fn run(mut self, mut rx: mpsc::Receiver<HubCommand>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd);
        }
        tracing::info!("hub stopped");
    }

    fn create_room(&mut self, conn: ConnId, req: RoomRequest) {
        match self.rooms.create_room(&req.room_id, &req.player_id) {
            Ok(color) => {
                self.subscribers
                    .insert(req.room_id.clone(), HashSet::from([conn]));
                self.send_to(conn, ServerEvent::room_created(&req.room_id, color));
            }
            Err(e) => {
                tracing::debug!(conn, error = %e, "create refused");
                self.send_to(conn, ServerEvent::RoomExists(room_ref(&req.room_id)));
            }
        }
    }

    fn join_room(&mut self, conn: ConnId, req: RoomRequest) {
        match self.rooms.join_room(&req.room_id, &req.player_id) {
            Ok(color) => {
                self.subscribers
                    .entry(req.room_id.clone())
                    .or_default()
                    .insert(conn);
                let first = self
                    .rooms
                    .session(&req.room_id)
                    .map(|s| s.current_color())
                    .unwrap_or(Color::Black);
                self.broadcast(&req.room_id, ServerEvent::player_joined(&req.player_id, color));
                self.broadcast(&req.room_id, ServerEvent::game_start(first));
            }
            Err(JoinError::NotFound(room_id)) => {
                self.send_to(conn, ServerEvent::RoomNotFound(room_ref(&room_id)));
            }
            Err(JoinError::Full(room_id)) => {
                self.send_to(conn, ServerEvent::RoomFull(room_ref(&room_id)));
            }
        }
    }

    fn submit_move(&mut self, conn: ConnId, req: MoveRequest) {
        match self.rooms.submit_move(&req.player_id, req.x, req.y) {
            Ok(room_move) => {
                self.broadcast(&room_move.room_id, ServerEvent::move_made(&room_move.outcome));
                if let Some(win) = &room_move.outcome.win {
                    self.broadcast(&room_move.room_id, ServerEvent::game_over(win));
                    self.subscribers.remove(&room_move.room_id);
                }
            }
            Err(rejection) => {
                tracing::debug!(
                    conn,
                    player_id = %req.player_id,
                    x = req.x,
                    y = req.y,
                    reason = rejection.code(),
                    "move rejected"
                );
                self.send_to(conn, ServerEvent::move_rejected(rejection));
            }
        }
    }

    fn send_to(&self, conn: ConnId, event: ServerEvent) {
        if let Some(sender) = self.connections.get(&conn) {
            // A closed receiver means the writer is gone; Disconnect follows.
            let _ = sender.send(event);
        }
    }

    fn broadcast(&self, room_id: &str, event: ServerEvent) {
        let Some(subs) = self.subscribers.get(room_id) else {
            return;
        };
        for conn in subs {
            self.send_to(*conn, event.clone());
        }
    }
}

fn room_ref(room_id: &str) -> RoomRef {
    RoomRef {
        room_id: room_id.to_string(),
    }
}

/// Start the hub task. The hub stops when all handles are dropped.
pub fn spawn_hub(rooms: RoomManager) -> (HubHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let task = tokio::spawn(Hub::new(rooms).run(rx));
    (HubHandle { tx }, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{GameStart, MoveMade, PlayerJoined};

    fn connect(hub: &mut Hub, conn: ConnId) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        hub.handle(HubCommand::Connect { conn, sender: tx });
        rx
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn room_req(room: &str, player: &str) -> RoomRequest {
        RoomRequest {
            room_id: room.into(),
            player_id: player.into(),
        }
    }

    fn create(hub: &mut Hub, conn: ConnId, room: &str, player: &str) {
        hub.handle(HubCommand::Request {
            conn,
            event: ClientEvent::CreateRoom(room_req(room, player)),
        });
    }

    fn join(hub: &mut Hub, conn: ConnId, room: &str, player: &str) {
        hub.handle(HubCommand::Request {
            conn,
            event: ClientEvent::JoinRoom(room_req(room, player)),
        });
    }

    fn play(hub: &mut Hub, conn: ConnId, player: &str, x: i64, y: i64) {
        hub.handle(HubCommand::Request {
            conn,
            event: ClientEvent::Move(MoveRequest {
                player_id: player.into(),
                x,
                y,
            }),
        });
    }

    #[test]
    fn test_create_join_broadcasts_to_room() {
        let mut hub = Hub::new(RoomManager::new());
        let mut a = connect(&mut hub, 1);
        let mut b = connect(&mut hub, 2);

        create(&mut hub, 1, "r1", "p1");
        assert_eq!(drain(&mut a), vec![ServerEvent::room_created("r1", Color::Black)]);
        assert!(drain(&mut b).is_empty());

        join(&mut hub, 2, "r1", "p2");
        let expected = vec![
            ServerEvent::PlayerJoined(PlayerJoined {
                player_id: "p2".into(),
                color_number: 2,
            }),
            ServerEvent::GameStart(GameStart { current_color: 1 }),
        ];
        assert_eq!(drain(&mut a), expected);
        assert_eq!(drain(&mut b), expected);
    }

    #[test]
    fn test_errors_go_to_requester_only() {
        let mut hub = Hub::new(RoomManager::new());
        let mut a = connect(&mut hub, 1);
        let mut b = connect(&mut hub, 2);
        let mut c = connect(&mut hub, 3);

        join(&mut hub, 3, "zz", "p3");
        assert_eq!(
            drain(&mut c),
            vec![ServerEvent::RoomNotFound(RoomRef { room_id: "zz".into() })]
        );
        assert_eq!(hub.rooms().room_count(), 0);

        create(&mut hub, 1, "r1", "p1");
        join(&mut hub, 2, "r1", "p2");
        drain(&mut a);
        drain(&mut b);

        create(&mut hub, 3, "r1", "p3");
        join(&mut hub, 3, "r1", "p3");
        assert_eq!(
            drain(&mut c),
            vec![
                ServerEvent::RoomExists(RoomRef { room_id: "r1".into() }),
                ServerEvent::RoomFull(RoomRef { room_id: "r1".into() }),
            ]
        );

        play(&mut hub, 3, "p3", 0, 0);
        assert_eq!(
            drain(&mut c),
            vec![ServerEvent::move_rejected(crate::game::MoveRejection::NotInRoom)]
        );
        assert!(drain(&mut a).is_empty());
        assert!(drain(&mut b).is_empty());
    }

    #[test]
    fn test_move_scenario() {
        let mut hub = Hub::new(RoomManager::new());
        let mut a = connect(&mut hub, 1);
        let _b = connect(&mut hub, 2);
        create(&mut hub, 1, "r1", "p1");
        join(&mut hub, 2, "r1", "p2");
        drain(&mut a);

        play(&mut hub, 1, "p1", 9, 9);
        play(&mut hub, 2, "p2", 9, 10);
        play(&mut hub, 2, "p2", 9, 11);

        let made: Vec<(u8, u32)> = drain(&mut a)
            .into_iter()
            .map(|ev| match ev {
                ServerEvent::MoveMade(MoveMade {
                    current_color,
                    turn_moves,
                    ..
                }) => (current_color, turn_moves),
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(made, vec![(2, 0), (2, 1), (1, 0)]);
    }

    #[test]
    fn test_win_broadcasts_game_over_and_unsubscribes() {
        let mut hub = Hub::new(RoomManager::new());
        let mut a = connect(&mut hub, 1);
        let mut b = connect(&mut hub, 2);
        create(&mut hub, 1, "r1", "p1");
        join(&mut hub, 2, "r1", "p2");

        // Black builds row 0, White scatters along row 18.
        play(&mut hub, 1, "p1", 0, 0);
        for turn in 0..3 {
            play(&mut hub, 2, "p2", turn * 4, 18);
            play(&mut hub, 2, "p2", turn * 4 + 2, 18);
            play(&mut hub, 1, "p1", turn * 2 + 1, 0);
            play(&mut hub, 1, "p1", turn * 2 + 2, 0);
        }
        drain(&mut b);
        let events = drain(&mut a);
        let over = events
            .iter()
            .find_map(|ev| match ev {
                ServerEvent::GameOver(g) => Some(g.clone()),
                _ => None,
            })
            .expect("game over broadcast");
        assert_eq!(over.winner_color, 1);
        assert_eq!(over.win_line, (0..6).map(|x| [x, 0]).collect::<Vec<_>>());

        // The trailing moves after the win are rejected, not broadcast.
        assert!(matches!(events.last(), Some(ServerEvent::MoveRejected(_))));
        assert!(!hub.rooms().session("r1").unwrap().is_started());

        // A new game in the same room only reaches its new members.
        create(&mut hub, 2, "r1", "p2");
        assert!(drain(&mut a).is_empty());
        assert_eq!(drain(&mut b), vec![ServerEvent::room_created("r1", Color::Black)]);
    }

    #[test]
    fn test_disconnect_drops_subscriptions() {
        let mut hub = Hub::new(RoomManager::new());
        let _a = connect(&mut hub, 1);
        create(&mut hub, 1, "r1", "p1");
        hub.handle(HubCommand::Disconnect { conn: 1 });
        assert_eq!(hub.connection_count(), 0);
        assert!(hub.subscribers.is_empty());
        // Room state survives the disconnect.
        assert_eq!(hub.rooms().room_of("p1"), Some("r1"));
    }

    #[tokio::test]
    async fn test_spawned_hub_processes_in_order() {
        let (handle, task) = spawn_hub(RoomManager::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(handle.send(HubCommand::Connect { conn: 7, sender: tx }).await);
        assert!(
            handle
                .send(HubCommand::Request {
                    conn: 7,
                    event: ClientEvent::CreateRoom(room_req("r1", "p1")),
                })
                .await
        );
        assert!(
            handle
                .send(HubCommand::Request {
                    conn: 7,
                    event: ClientEvent::CreateRoom(room_req("r1", "p2")),
                })
                .await
        );

        assert_eq!(rx.recv().await, Some(ServerEvent::room_created("r1", Color::Black)));
        assert_eq!(
            rx.recv().await,
            Some(ServerEvent::RoomExists(RoomRef { room_id: "r1".into() }))
        );

        drop(handle);
        task.await.unwrap();
    }
}
