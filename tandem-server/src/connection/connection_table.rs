use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{ConnectionId, Role, RoomId};

/// Server-side view of one live transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub name: String,
    pub room: Option<RoomId>,
    pub role: Role,
}

impl Connection {
    fn new(id: ConnectionId) -> Self {
        Self {
            id,
            name: String::new(),
            room: None,
            role: Role::Unassigned,
        }
    }
}

/// Live connections keyed by their server-assigned id.
#[derive(Clone, Default)]
pub struct ConnectionTable {
    inner: Arc<DashMap<ConnectionId, Connection>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId) {
        self.inner.insert(id, Connection::new(id));
    }

    pub fn remove(&self, id: &ConnectionId) -> Option<Connection> {
        self.inner.remove(id).map(|(_, conn)| conn)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<Connection> {
        self.inner.get(id).map(|conn| conn.clone())
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn name_of(&self, id: &ConnectionId) -> String {
        self.inner
            .get(id)
            .map(|conn| conn.name.clone())
            .unwrap_or_default()
    }

    pub fn set_name(&self, id: &ConnectionId, name: &str) {
        if let Some(mut conn) = self.inner.get_mut(id) {
            conn.name = name.to_owned();
        }
    }

    /// Points the connection at `room`. Returns `false` when the connection
    /// is already gone.
    pub fn assign(&self, id: &ConnectionId, room: RoomId, role: Role) -> bool {
        let Some(mut conn) = self.inner.get_mut(id) else {
            return false;
        };
        conn.room = Some(room);
        conn.role = role;
        true
    }

    /// Returns the connection to the unjoined state, but only if it still
    /// points at `room` (it may already have moved on).
    pub fn unassign_if_in(&self, id: &ConnectionId, room: &RoomId) {
        if let Some(mut conn) = self.inner.get_mut(id) {
            if conn.room.as_ref() == Some(room) {
                conn.room = None;
                conn.role = Role::Unassigned;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
