// Game engine modules

pub mod arbiter;
pub mod bag;
pub mod board;
pub mod disputes;
pub mod layout;
pub mod moves;
pub mod scorer;
pub mod session;
pub mod timer;
pub mod turns;

pub use board::{Board, TileGrid};
pub use scorer::Scorer;
pub use session::{GameSession, Outbound};
pub use timer::{PhaseTimer, TimerDriver, TimerToken};
