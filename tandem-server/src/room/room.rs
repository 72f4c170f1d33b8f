use tandem_core::{ConnectionId, RoomId};

/// Snapshot of one room: its host and members in join order.
///
/// The host is always `members[0]`; the registry never lets it be removed
/// without destroying the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    host: ConnectionId,
    members: Vec<ConnectionId>,
}

impl Room {
    pub(crate) fn new(id: RoomId, host: ConnectionId) -> Self {
        Self {
            id,
            host,
            members: vec![host],
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn host(&self) -> ConnectionId {
        self.host
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_member(&self, conn: &ConnectionId) -> bool {
        self.members.contains(conn)
    }

    /// Every member except `conn`, in join order.
    pub fn others(&self, conn: &ConnectionId) -> Vec<ConnectionId> {
        self.members.iter().filter(|m| *m != conn).copied().collect()
    }

    /// Returns false if `conn` was already a member.
    pub(crate) fn push_member(&mut self, conn: ConnectionId) -> bool {
        if self.is_member(&conn) {
            return false;
        }
        self.members.push(conn);
        true
    }

    /// Returns false if `conn` was not a member.
    pub(crate) fn drop_member(&mut self, conn: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != conn);
        self.members.len() != before
    }
}
