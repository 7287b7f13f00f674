use crate::auth::{AuthProvider, TokenAuth};
use crate::service::{MessageService, RelayService, RoomService};
use crate::store::{FileStore, MessageStore, RoomStore, SignalStore};
use beacon_core::model::IceServerConfig;
use std::sync::Arc;

/// Shared handler state: every service plus the auth seam.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub relay: RelayService,
    pub rooms: RoomService,
    pub messages: MessageService,
    pub files: Arc<FileStore>,
    pub ice_servers: Vec<IceServerConfig>,
}

impl AppState {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        let signals = Arc::new(SignalStore::new());
        let rooms = Arc::new(RoomStore::new());
        let messages = Arc::new(MessageStore::new());
        let files = Arc::new(FileStore::new());

        Self {
            auth: Arc::new(TokenAuth::new()),
            relay: RelayService::new(signals, rooms.clone()),
            rooms: RoomService::new(rooms.clone()),
            messages: MessageService::new(messages, files.clone(), rooms),
            files,
            ice_servers,
        }
    }
}
