// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use tokio::runtime::Handle;
use tracing::debug;

use crate::app::deps::DynRoomManagementService;
use crate::domain::rooms::services::{
    RoomManagementService, RoomOperationBackend, RoomOperationHandle, RoomOperationRequest,
    RoomOperationResult,
};
use crate::domain::shared::models::RoomId;

/// Runs room operations as tasks on `runtime` against a `RoomManagementService`. Cancelling an
/// operation aborts its task.
pub struct TaskRoomOperationBackend {
    service: DynRoomManagementService,
    runtime: Handle,
}

impl TaskRoomOperationBackend {
    pub fn new(service: DynRoomManagementService, runtime: Handle) -> Self {
        Self { service, runtime }
    }
}

impl RoomOperationBackend for TaskRoomOperationBackend {
    fn start_operation(
        &self,
        room_id: &RoomId,
        request: RoomOperationRequest,
    ) -> RoomOperationHandle {
        let (tx, handle) = RoomOperationHandle::channel();
        let service = self.service.clone();
        let room_id = room_id.clone();

        let task = self.runtime.spawn(async move {
            let result = perform_request(&*service, &room_id, request).await;
            if tx.send(result).is_err() {
                debug!(room = %room_id, "Room operation finished after its controller went away.");
            }
        });

        handle.with_cancel_hook(move || task.abort())
    }
}

async fn perform_request(
    service: &dyn RoomManagementService,
    room_id: &RoomId,
    request: RoomOperationRequest,
) -> RoomOperationResult {
    match request {
        RoomOperationRequest::Join { nickname, password } => {
            service
                .join_room(room_id, &nickname, password.as_deref())
                .await
        }
        RoomOperationRequest::Leave { nickname } => service.leave_room(room_id, &nickname).await,
        RoomOperationRequest::Destroy {
            alternative_room_id,
            reason,
        } => {
            service
                .destroy_room(room_id, alternative_room_id.as_ref(), reason.as_deref())
                .await
        }
        RoomOperationRequest::SetAffiliation {
            nickname,
            affiliation,
            reason,
        } => {
            service
                .set_affiliation(room_id, &nickname, affiliation, reason.as_deref())
                .await
        }
        RoomOperationRequest::SetRole {
            nickname,
            role,
            reason,
        } => {
            service
                .set_role(room_id, &nickname, role, reason.as_deref())
                .await
        }
    }
}
