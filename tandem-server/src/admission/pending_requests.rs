use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{ConnectionId, RoomId};

/// A join request waiting for the host's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub requester: ConnectionId,
    pub room_id: RoomId,
    pub name: String,
}

/// Unresolved join requests keyed by `(room, requester)`.
///
/// Taking a request out is the only way to resolve it, which makes every
/// request resolve at most once.
#[derive(Clone, Default)]
pub struct PendingRequests {
    inner: Arc<DashMap<(RoomId, ConnectionId), JoinRequest>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the request, replacing an earlier one from the same requester.
    pub fn insert(&self, request: JoinRequest) {
        let key = (request.room_id.clone(), request.requester);
        self.inner.insert(key, request);
    }

    pub fn take(&self, room_id: &RoomId, requester: &ConnectionId) -> Option<JoinRequest> {
        self.inner
            .remove(&(room_id.clone(), *requester))
            .map(|(_, request)| request)
    }

    pub fn contains(&self, room_id: &RoomId, requester: &ConnectionId) -> bool {
        self.inner.contains_key(&(room_id.clone(), *requester))
    }

    /// Discards everything `requester` is waiting on.
    pub fn forget_requester(&self, requester: &ConnectionId) {
        self.inner.retain(|(_, conn), _| conn != requester);
    }

    /// Discards every request against `room_id` and returns the requesters.
    pub fn drain_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let mut requesters = Vec::new();
        self.inner.retain(|(room, conn), _| {
            if room == room_id {
                requesters.push(*conn);
                false
            } else {
                true
            }
        });
        requesters
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
