pub mod handler;
pub mod handshake;
pub mod messages;

pub use handler::handle_websocket;
