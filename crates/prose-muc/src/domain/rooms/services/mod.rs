// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use room_management_service::RoomManagementService;
pub use room_operation_backend::{
    CancelHook, RoomOperationBackend, RoomOperationHandle, RoomOperationRequest,
    RoomOperationResult,
};

mod room_management_service;
mod room_operation_backend;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::room_management_service::MockRoomManagementService;
    pub use super::room_operation_backend::MockRoomOperationBackend;
}
