// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::str::FromStr;

use tracing::debug;

use crate::app::event_handlers::{RoomServerEvent, RoomServerEventType, ServerEvent};
use crate::domain::rooms::models::{MucError, MucErrorCondition, MucErrorPayload};

/// Maps the error payload of a MUC response to a typed `MucError`. Unknown conditions are kept
/// as `MucError::Unknown`.
pub fn map_protocol_error(payload: MucErrorPayload) -> MucError {
    let Ok(condition) = MucErrorCondition::from_str(&payload.condition) else {
        debug!(room = %payload.room_id, "Unknown MUC error condition '{}'.", payload.condition);
        return MucError::Unknown { payload };
    };

    let MucErrorPayload { room_id, text, .. } = payload;

    match condition {
        MucErrorCondition::NotAuthorized => MucError::NotAuthorized { room_id, text },
        MucErrorCondition::Forbidden => MucError::Forbidden { room_id, text },
        MucErrorCondition::ItemNotFound => MucError::ItemNotFound { room_id, text },
        MucErrorCondition::NotAllowed => MucError::NotAllowed { room_id, text },
        MucErrorCondition::NotAcceptable => MucError::NotAcceptable { room_id, text },
        MucErrorCondition::RegistrationRequired => {
            MucError::RegistrationRequired { room_id, text }
        }
        MucErrorCondition::Conflict => MucError::Conflict { room_id, text },
        MucErrorCondition::ServiceUnavailable => MucError::ServiceUnavailable { room_id, text },
    }
}

impl From<MucErrorPayload> for MucError {
    fn from(value: MucErrorPayload) -> Self {
        map_protocol_error(value)
    }
}

impl From<MucErrorPayload> for ServerEvent {
    fn from(value: MucErrorPayload) -> Self {
        ServerEvent::Room(RoomServerEvent {
            room_id: value.room_id.clone(),
            r#type: RoomServerEventType::Error {
                error: map_protocol_error(value),
            },
        })
    }
}
