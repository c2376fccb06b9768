// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::app::services::RoomSession;
use crate::domain::shared::models::RoomId;

/// The room sessions server events are routed to.
#[derive(Clone, Default)]
pub struct ConnectedRooms {
    sessions: Arc<RwLock<HashMap<RoomId, RoomSession>>>,
}

impl ConnectedRooms {
    /// Registers `session`, returning the session previously registered for the same room.
    pub fn insert(&self, session: RoomSession) -> Option<RoomSession> {
        self.sessions
            .write()
            .insert(session.room_id().clone(), session)
    }

    pub fn get(&self, room_id: &RoomId) -> Option<RoomSession> {
        self.sessions.read().get(room_id).cloned()
    }

    pub fn remove(&self, room_id: &RoomId) -> Option<RoomSession> {
        self.sessions.write().remove(room_id)
    }

    pub fn all(&self) -> Vec<RoomSession> {
        self.sessions.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
