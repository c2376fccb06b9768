// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use async_trait::async_trait;

pub use room_event::{RoomEvent, RoomEventType};
pub use room_event_bus::{RoomEventBus, RoomEventCallback};
pub use rooms_event_handler::RoomsEventHandler;
pub use server_event::*;

mod room_event;
mod room_event_bus;
mod rooms_event_handler;
mod server_event;

/// `ServerEventHandler` is a trait representing a handler for server events.
///
/// If the handler returns `None`, the event has been consumed and no further processing should
/// be done. If it returns `Some(event)`, the event should be passed to the next handler.
#[async_trait]
pub trait ServerEventHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle_event(&self, event: ServerEvent) -> Result<Option<ServerEvent>>;
}
