//! Authoritative server for a two-player six-in-a-row stone game.

pub mod config;
pub mod game;
pub mod hub;
pub mod protocol;
pub mod rooms;
pub mod selfplay;
pub mod server;
