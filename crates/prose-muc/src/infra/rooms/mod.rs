// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use task_room_operation_backend::TaskRoomOperationBackend;

mod task_room_operation_backend;
