// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::app::deps::DynAppContext;
use crate::app::event_handlers::{
    ConnectionEvent, RoomServerEvent, RoomServerEventType, ServerEvent, ServerEventHandler,
};
use crate::app::services::{ConnectedRooms, RoomSession};
use crate::domain::rooms::models::RoomOperationError;
use crate::domain::shared::models::RoomId;

/// Routes room events to the session of the room they belong to and keeps track of the
/// connection our user is logged in with.
pub struct RoomsEventHandler {
    ctx: DynAppContext,
    connected_rooms: ConnectedRooms,
}

impl RoomsEventHandler {
    pub fn new(ctx: DynAppContext, connected_rooms: ConnectedRooms) -> Self {
        Self {
            ctx,
            connected_rooms,
        }
    }
}

#[async_trait]
impl ServerEventHandler for RoomsEventHandler {
    fn name(&self) -> &'static str {
        "rooms"
    }

    async fn handle_event(&self, event: ServerEvent) -> Result<Option<ServerEvent>> {
        match event {
            ServerEvent::Room(event) => self.handle_room_event(event)?,
            ServerEvent::Connection(ref connection_event) => {
                self.handle_connection_event(connection_event);
                // Other handlers might be interested in the connection status as well.
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

impl RoomsEventHandler {
    fn get_session(&self, room_id: &RoomId) -> Result<RoomSession> {
        self.connected_rooms
            .get(room_id)
            .ok_or(anyhow::format_err!("Could not find room with id {}", room_id))
    }

    fn handle_room_event(&self, event: RoomServerEvent) -> Result<()> {
        let session = self.get_session(&event.room_id)?;

        let is_final = matches!(
            event.r#type,
            RoomServerEventType::SelfRemoved { .. } | RoomServerEventType::Destroyed { .. }
        );

        session.handle_server_event(event.r#type);

        if is_final {
            info!(room = %event.room_id, "Disconnecting from room.");
            self.connected_rooms.remove(&event.room_id);
        }

        Ok(())
    }

    fn handle_connection_event(&self, event: &ConnectionEvent) {
        match event {
            ConnectionEvent::Connected { id } => {
                info!(who = %id, "Connected.");
                self.ctx.set_connected_id(id.clone());
            }
            ConnectionEvent::Disconnected => {
                for session in self.connected_rooms.all() {
                    let count = session.fail_active_operations(RoomOperationError::Disconnected);
                    if count > 0 {
                        info!(
                            who = %self.ctx.who(),
                            room = %session.room_id(),
                            "Failed {} room operation(s) after losing the connection.",
                            count
                        );
                    }
                }
                self.ctx.reset_connected_id();
            }
        }
    }
}
