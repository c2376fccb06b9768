// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use strum_macros::{Display, EnumIter, EnumString};

use crate::domain::shared::models::RoomId;

/// An error reported by a MUC service as it arrives from the transport layer, i.e. the
/// defined-condition element name (`conflict`, `forbidden`, …) plus the optional human readable
/// text.
#[derive(Debug, Clone, PartialEq)]
pub struct MucErrorPayload {
    pub room_id: RoomId,
    pub condition: String,
    pub text: Option<String>,
}

/// The defined conditions a MUC service uses to reject room requests (XEP-0045, 7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum MucErrorCondition {
    /// A password is required, or the supplied one was wrong.
    NotAuthorized,
    /// The user is banned from the room.
    Forbidden,
    /// The room does not exist and cannot be created.
    ItemNotFound,
    /// Room creation is restricted.
    NotAllowed,
    /// The reserved nickname must be used, or the message was rejected.
    NotAcceptable,
    /// The room is members-only and the user is not a member.
    RegistrationRequired,
    /// The nickname is already in use or registered by someone else.
    Conflict,
    /// The maximum number of occupants has been reached.
    ServiceUnavailable,
}

/// A typed MUC error. Every payload maps to exactly one variant. Conditions we don't know about
/// are kept as `Unknown` together with the raw payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MucError {
    #[error("Not authorized to enter room {room_id}.")]
    NotAuthorized { room_id: RoomId, text: Option<String> },
    #[error("Forbidden to enter room {room_id}.")]
    Forbidden { room_id: RoomId, text: Option<String> },
    #[error("Room {room_id} could not be found.")]
    ItemNotFound { room_id: RoomId, text: Option<String> },
    #[error("Not allowed to create room {room_id}.")]
    NotAllowed { room_id: RoomId, text: Option<String> },
    #[error("Request to room {room_id} was not acceptable.")]
    NotAcceptable { room_id: RoomId, text: Option<String> },
    #[error("Registration is required to enter room {room_id}.")]
    RegistrationRequired { room_id: RoomId, text: Option<String> },
    #[error("Nickname conflict in room {room_id}.")]
    Conflict { room_id: RoomId, text: Option<String> },
    #[error("Room {room_id} is unavailable.")]
    ServiceUnavailable { room_id: RoomId, text: Option<String> },
    #[error("Unknown MUC error '{}' in room {}.", .payload.condition, .payload.room_id)]
    Unknown { payload: MucErrorPayload },
}

impl MucError {
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::NotAuthorized { room_id, .. }
            | Self::Forbidden { room_id, .. }
            | Self::ItemNotFound { room_id, .. }
            | Self::NotAllowed { room_id, .. }
            | Self::NotAcceptable { room_id, .. }
            | Self::RegistrationRequired { room_id, .. }
            | Self::Conflict { room_id, .. }
            | Self::ServiceUnavailable { room_id, .. } => room_id,
            Self::Unknown { payload } => &payload.room_id,
        }
    }

    /// Returns the condition this error was mapped from, if it was a known one.
    pub fn condition(&self) -> Option<MucErrorCondition> {
        let condition = match self {
            Self::NotAuthorized { .. } => MucErrorCondition::NotAuthorized,
            Self::Forbidden { .. } => MucErrorCondition::Forbidden,
            Self::ItemNotFound { .. } => MucErrorCondition::ItemNotFound,
            Self::NotAllowed { .. } => MucErrorCondition::NotAllowed,
            Self::NotAcceptable { .. } => MucErrorCondition::NotAcceptable,
            Self::RegistrationRequired { .. } => MucErrorCondition::RegistrationRequired,
            Self::Conflict { .. } => MucErrorCondition::Conflict,
            Self::ServiceUnavailable { .. } => MucErrorCondition::ServiceUnavailable,
            Self::Unknown { .. } => return None,
        };
        Some(condition)
    }
}
