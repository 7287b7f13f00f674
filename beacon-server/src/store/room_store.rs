use beacon_core::model::{Participant, Role, Room, RoomId, UserId};
use beacon_core::time::unix_millis;
use dashmap::DashMap;

const DEFAULT_MAX_PARTICIPANTS: u32 = 10;

/// Rooms plus their participant lists.
///
/// A participant row is never removed once a user has joined; leaving only
/// flips `is_connected`, so re-joining keeps the original role.
pub struct RoomStore {
    rooms: DashMap<RoomId, Room>,
    participants: DashMap<RoomId, Vec<Participant>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            participants: DashMap::new(),
        }
    }

    /// Create a room and seat its creator as the connected host.
    pub fn create(
        &self,
        name: String,
        creator: UserId,
        creator_name: String,
        max_participants: Option<u32>,
    ) -> Room {
        let room = Room {
            id: RoomId::new(),
            name,
            created_by: creator.clone(),
            max_participants: max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS),
            is_active: true,
            created_at: unix_millis(),
        };

        let host = Participant {
            user_id: creator,
            display_name: creator_name,
            role: Role::Host,
            is_connected: true,
            last_seen: unix_millis(),
        };

        self.participants.insert(room.id.clone(), vec![host]);
        self.rooms.insert(room.id.clone(), room.clone());
        room
    }

    pub fn get(&self, room_id: &RoomId) -> Option<Room> {
        self.rooms.get(room_id).map(|r| r.clone())
    }

    /// Join or re-join. An existing participant is reconnected with their
    /// original role; a new one is seated with `role_if_new`.
    pub fn upsert_participant(
        &self,
        room_id: &RoomId,
        user: UserId,
        display_name: String,
        role_if_new: Role,
    ) {
        let mut seats = self.participants.entry(room_id.clone()).or_default();

        if let Some(existing) = seats.iter_mut().find(|p| p.user_id == user) {
            existing.is_connected = true;
            existing.last_seen = unix_millis();
            return;
        }

        seats.push(Participant {
            user_id: user,
            display_name,
            role: role_if_new,
            is_connected: true,
            last_seen: unix_millis(),
        });
    }

    /// Mark a participant disconnected. Unknown users are ignored.
    pub fn disconnect_participant(&self, room_id: &RoomId, user: &UserId) {
        let Some(mut seats) = self.participants.get_mut(room_id) else {
            return;
        };
        if let Some(participant) = seats.iter_mut().find(|p| &p.user_id == user) {
            participant.is_connected = false;
            participant.last_seen = unix_millis();
        }
    }

    pub fn list_by_room(&self, room_id: &RoomId) -> Vec<Participant> {
        self.participants
            .get(room_id)
            .map(|seats| seats.clone())
            .unwrap_or_default()
    }

    pub fn find(&self, room_id: &RoomId, user: &UserId) -> Option<Participant> {
        self.participants
            .get(room_id)?
            .iter()
            .find(|p| &p.user_id == user)
            .cloned()
    }

    /// Rooms the user has ever joined, with the role they hold there.
    pub fn list_by_user(&self, user: &UserId) -> Vec<(Room, Role)> {
        let mut out = Vec::new();
        for entry in self.participants.iter() {
            let Some(participant) = entry.value().iter().find(|p| &p.user_id == user) else {
                continue;
            };
            let Some(room) = self.rooms.get(entry.key()) else {
                continue;
            };
            out.push((room.clone(), participant.role));
        }
        out.sort_by_key(|(room, _)| room.created_at);
        out
    }

    pub fn connected_count(&self, room_id: &RoomId) -> usize {
        self.participants
            .get(room_id)
            .map(|seats| seats.iter().filter(|p| p.is_connected).count())
            .unwrap_or(0)
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}
