// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::app::deps::app_context::AppContext;
use crate::app::deps::coordinator::Coordinator;
use crate::domain::rooms::services::{RoomManagementService, RoomOperationBackend};

pub type DynAppContext = Arc<AppContext>;
pub type DynCoordinator = Arc<dyn Coordinator>;
pub type DynRoomManagementService = Arc<dyn RoomManagementService>;
pub type DynRoomOperationBackend = Arc<dyn RoomOperationBackend>;

#[derive(Clone)]
pub struct AppDependencies {
    pub ctx: DynAppContext,
    /// The runtime room operations are spawned on. Operations can be started from threads that
    /// aren't part of it.
    pub runtime: Handle,
    pub coordinator: DynCoordinator,
    pub room_operation_backend: DynRoomOperationBackend,
}
