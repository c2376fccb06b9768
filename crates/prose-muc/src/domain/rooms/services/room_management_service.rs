// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;

use crate::domain::rooms::models::{RoomAffiliation, RoomOperationError, RoomRole};
use crate::domain::shared::models::{Nickname, RoomId};

/// The requests our user can send to a MUC service. Implementations talk to the server and map
/// error stanzas to `RoomOperationError::Muc`.
#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait RoomManagementService: Send + Sync {
    async fn join_room(
        &self,
        room_id: &RoomId,
        nickname: &Nickname,
        password: Option<&str>,
    ) -> Result<(), RoomOperationError>;

    async fn leave_room(&self, room_id: &RoomId, nickname: &Nickname)
        -> Result<(), RoomOperationError>;

    async fn destroy_room(
        &self,
        room_id: &RoomId,
        alternative_room_id: Option<&RoomId>,
        reason: Option<&str>,
    ) -> Result<(), RoomOperationError>;

    async fn set_affiliation(
        &self,
        room_id: &RoomId,
        nickname: &Nickname,
        affiliation: RoomAffiliation,
        reason: Option<&str>,
    ) -> Result<(), RoomOperationError>;

    async fn set_role(
        &self,
        room_id: &RoomId,
        nickname: &Nickname,
        role: RoomRole,
        reason: Option<&str>,
    ) -> Result<(), RoomOperationError>;
}
