use crate::error::RegistryError;
use crate::room::Room;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tandem_core::{ConnectionId, RoomId};
use tracing::info;

/// Authoritative table of live rooms.
///
/// Every membership read-modify-write runs under the map entry's guard, and
/// every method hands back an owned [`Room`] snapshot so no caller ever holds
/// a registry lock while delivering messages.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new room with `host` as its first member. An existing room
    /// under the same id is left untouched.
    pub fn create_room(&self, room_id: RoomId, host: ConnectionId) -> Result<Room, RegistryError> {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyExists(room_id)),
            Entry::Vacant(slot) => {
                let room = Room::new(room_id, host);
                slot.insert(room.clone());
                info!("Room {} created by {}", room.id(), host);
                Ok(room)
            }
        }
    }

    pub fn lookup(&self, room_id: &RoomId) -> Result<Room, RegistryError> {
        self.rooms
            .get(room_id)
            .map(|room| room.clone())
            .ok_or_else(|| RegistryError::NotFound(room_id.clone()))
    }

    /// Adds `conn` to the room and returns the membership after the change.
    /// Adding an existing member is a no-op.
    pub fn add_member(&self, room_id: &RoomId, conn: ConnectionId) -> Result<Room, RegistryError> {
        let mut room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RegistryError::NotFound(room_id.clone()))?;
        room.push_member(conn);
        Ok(room.clone())
    }

    /// Removes a non-host member and returns the membership after the change.
    pub fn remove_member(
        &self,
        room_id: &RoomId,
        conn: &ConnectionId,
    ) -> Result<Room, RegistryError> {
        let mut room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RegistryError::NotFound(room_id.clone()))?;

        if room.host() == *conn {
            return Err(RegistryError::HostMember {
                room: room_id.clone(),
                conn: *conn,
            });
        }
        if !room.drop_member(conn) {
            return Err(RegistryError::NotMember {
                room: room_id.clone(),
                conn: *conn,
            });
        }
        Ok(room.clone())
    }

    /// Destroys the room, but only while it is still hosted by `host`, and
    /// returns its final membership. A room recreated under the same id by
    /// someone else is left alone.
    pub fn destroy(&self, room_id: &RoomId, host: &ConnectionId) -> Option<Room> {
        let (_, room) = self
            .rooms
            .remove_if(room_id, |_, room| room.host() == *host)?;
        info!("Room {} destroyed by host {}", room_id, host);
        Some(room)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
