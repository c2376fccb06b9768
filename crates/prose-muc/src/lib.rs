// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use app::deps::{AppContext, AppDependencies, Coordinator, MucConfig};
pub use app::event_handlers::{
    RoomEvent, RoomEventBus, RoomEventType, RoomsEventHandler, ServerEvent, ServerEventHandler,
};
pub use app::services::{
    ConnectedRooms, RoomOpCancelHandle, RoomOpController, RoomOpState, RoomOperation,
    RoomOperationKind, RoomSession,
};
pub use infra::coordinator::{ChannelCoordinator, CoordinatorLoop};
pub use infra::rooms::TaskRoomOperationBackend;
pub use infra::xmpp::type_conversions::map_protocol_error;

pub mod app;
pub mod domain;
pub mod infra;


pub(crate) mod util;
