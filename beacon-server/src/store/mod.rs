mod file_store;
mod message_store;
mod room_store;
mod signal_store;

pub use file_store::*;
pub use message_store::*;
pub use room_store::*;
pub use signal_store::*;
