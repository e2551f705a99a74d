pub mod board;
pub mod session;
pub mod types;

pub use board::Board;
pub use session::GameSession;
pub use types::*;
