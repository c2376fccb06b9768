// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::shared::models::{Nickname, RoomId};

use super::MucError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RoomValidationError {
    #[error("Unknown affiliation '{0}'.")]
    UnknownAffiliation(String),
    #[error("Unknown role '{0}'.")]
    UnknownRole(String),
}

/// Errors a room operation can fail with after it has been handed to the backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RoomOperationError {
    #[error(transparent)]
    Muc(#[from] MucError),
    #[error("Room operation timed out.")]
    TimedOut,
    /// The connection was lost while the operation was in flight.
    #[error("The connection was lost before the room operation completed.")]
    Disconnected,
    #[error("The backend dropped the room operation without reporting a result.")]
    Aborted,
    #[error("Room operation failed: {msg}")]
    Generic { msg: String },
}

#[derive(thiserror::Error, Debug)]
pub enum RoomError {
    #[error("Room {0} has been closed.")]
    RoomIsClosed(RoomId),
    #[error("Could not find occupant '{nickname}' in room {room_id}.")]
    OccupantNotFound { room_id: RoomId, nickname: Nickname },
    #[error("Our user is not joined to room {0}.")]
    NotJoined(RoomId),
    #[error("Not allowed to {action} in room {room_id}.")]
    NotAllowed { room_id: RoomId, action: String },
    #[error("A '{operation}' operation is already in progress in room {room_id}.")]
    OperationInProgress { room_id: RoomId, operation: String },
    #[error(transparent)]
    RoomValidationError(#[from] RoomValidationError),
    #[error(transparent)]
    RoomOperationError(#[from] RoomOperationError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
