//! In-memory relay server: rooms, chat, file sharing and the signaling
//! store/poll/ack API that peers use to negotiate their media connection.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod service;
pub mod store;

pub use auth::{AuthProvider, TokenAuth};
pub use config::{ServerConfig, default_ice_servers};
pub use error::ServerError;
pub use http::{AppState, AuthedUser, MaybeUser, router, serve};
pub use service::{MessageService, RelayService, RoomService};
pub use store::{FileStore, MessageStore, RoomStore, SignalStore};
