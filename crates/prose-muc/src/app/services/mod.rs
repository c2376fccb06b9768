// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use connected_rooms::ConnectedRooms;
pub use room_op_controller::{RoomOpCancelHandle, RoomOpController, RoomOpState};
pub use room_session::{RoomOperation, RoomOperationKind, RoomSession};

mod connected_rooms;
mod room_op_controller;
mod room_session;
