use crate::error::ServerError;
use crate::store::RoomStore;
use beacon_core::model::{Role, RoomId, UserId};
use beacon_core::wire::{CreateRoomRequest, RoomDetails, RoomSummary};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct RoomService {
    rooms: Arc<RoomStore>,
}

impl RoomService {
    pub fn new(rooms: Arc<RoomStore>) -> Self {
        Self { rooms }
    }

    pub fn create_room(
        &self,
        creator: &UserId,
        creator_name: &str,
        req: CreateRoomRequest,
    ) -> Result<RoomDetails, ServerError> {
        if req.name.trim().is_empty() {
            return Err(ServerError::validation("room name must not be empty"));
        }

        let room = self.rooms.create(
            req.name,
            creator.clone(),
            creator_name.to_string(),
            req.max_participants,
        );
        info!("room {:?} created by {:?}", room.id, creator);

        Ok(RoomDetails {
            participants: self.rooms.list_by_room(&room.id),
            room,
        })
    }

    /// Join or re-join a room. New users are seated as viewers; a returning
    /// user keeps the role they had.
    pub fn join_room(
        &self,
        room_id: &RoomId,
        user: &UserId,
        display_name: &str,
    ) -> Result<RoomDetails, ServerError> {
        let Some(room) = self.rooms.get(room_id) else {
            return Err(ServerError::not_found("room", room_id));
        };
        if !room.is_active {
            return Err(ServerError::not_found("room", room_id));
        }

        self.rooms.upsert_participant(
            room_id,
            user.clone(),
            display_name.to_string(),
            Role::Viewer,
        );
        info!("user {:?} joined room {:?}", user, room_id);

        Ok(RoomDetails {
            participants: self.rooms.list_by_room(room_id),
            room,
        })
    }

    /// Mark the caller disconnected. Leaving a room you never joined is
    /// a no-op.
    pub fn leave_room(&self, room_id: &RoomId, user: &UserId) {
        self.rooms.disconnect_participant(room_id, user);
        info!("user {:?} left room {:?}", user, room_id);
    }

    pub fn room_details(&self, room_id: &RoomId) -> Result<RoomDetails, ServerError> {
        let Some(room) = self.rooms.get(room_id) else {
            return Err(ServerError::not_found("room", room_id));
        };

        Ok(RoomDetails {
            participants: self.rooms.list_by_room(room_id),
            room,
        })
    }

    /// Rooms the caller participates in, with their role there.
    pub fn user_rooms(&self, user: &UserId) -> Vec<RoomSummary> {
        self.rooms
            .list_by_user(user)
            .into_iter()
            .map(|(room, role)| RoomSummary {
                connected_count: self.rooms.connected_count(&room.id),
                id: room.id,
                name: room.name,
                is_active: room.is_active,
                role,
                created_at: room.created_at,
            })
            .collect()
    }
}
