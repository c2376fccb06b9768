// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::rooms::models::{
    Actor, MucError, Occupant, RoomAffiliation, RoomClosedReason, RoomConfig, RoomRole,
};
use crate::domain::shared::models::{Nickname, RoomId, UserId};

/// Normalized events received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Event related to the connection status.
    Connection(ConnectionEvent),
    /// Events about changes to a MUC room.
    Room(RoomServerEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// We're connected as `id`.
    Connected { id: UserId },
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomServerEvent {
    pub room_id: RoomId,
    pub r#type: RoomServerEventType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomServerEventType {
    /// Our own presence in the room. Sent last when we join and again whenever it changes.
    SelfPresence { occupant: Occupant },
    /// Another occupant joined or changed their presence.
    OccupantPresence { occupant: Occupant },
    /// Another occupant left the room.
    OccupantLeft { nickname: Nickname },
    AffiliationChanged {
        nickname: Nickname,
        affiliation: RoomAffiliation,
        reason: Option<String>,
        actor: Option<Actor>,
    },
    RoleChanged {
        nickname: Nickname,
        role: RoomRole,
        reason: Option<String>,
        actor: Option<Actor>,
    },
    /// We're no longer in the room, i.e. because we were kicked or banned.
    SelfRemoved { reason: RoomClosedReason },
    MessageReceived {
        nickname: Option<Nickname>,
        body: String,
    },
    SubjectChanged { subject: Option<String> },
    RoomInfoReceived { config: RoomConfig },
    LoggingEnabled,
    LoggingDisabled,
    /// The room was destroyed and potentially replaced by `alternative_room_id`.
    Destroyed {
        alternative_room_id: Option<RoomId>,
        reason: Option<String>,
    },
    /// The room responded with an error.
    Error { error: MucError },
}
