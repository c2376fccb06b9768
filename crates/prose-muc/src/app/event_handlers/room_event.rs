// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use strum_macros::{Display, EnumIter};

use crate::domain::rooms::models::{
    MucError, Occupant, OccupantChange, RoomClosedReason, RoomConfig,
};
use crate::domain::shared::models::Nickname;

/// Events published on a room's event bus. Each event carries a snapshot of the state it is about
/// so that subscribers don't need to read the room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    SelfJoined {
        occupant: Occupant,
    },
    OccupantJoined {
        occupant: Occupant,
    },
    OccupantUpdated {
        occupant: Occupant,
        change: OccupantChange,
    },
    OccupantLeft {
        occupant: Occupant,
    },
    RoomInfoReceived {
        config: RoomConfig,
    },
    MessageReceived {
        /// `None` if the message was sent by the room itself.
        nickname: Option<Nickname>,
        body: String,
    },
    LoggingEnabled,
    LoggingDisabled,
    RegistrationRequired {
        nickname: Option<Nickname>,
    },
    NicknameConflict {
        nickname: Option<Nickname>,
    },
    PreSwitchToLobby,
    PreSwitchToMain,
    SubjectChanged {
        subject: Option<String>,
    },
    ErrorReceived {
        error: MucError,
    },
    RoomClosed {
        reason: RoomClosedReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum RoomEventType {
    SelfJoined,
    OccupantJoined,
    OccupantUpdated,
    OccupantLeft,
    RoomInfoReceived,
    MessageReceived,
    LoggingEnabled,
    LoggingDisabled,
    RegistrationRequired,
    NicknameConflict,
    PreSwitchToLobby,
    PreSwitchToMain,
    SubjectChanged,
    #[strum(to_string = "room-error-received")]
    ErrorReceived,
    RoomClosed,
}

impl RoomEvent {
    pub fn event_type(&self) -> RoomEventType {
        match self {
            Self::SelfJoined { .. } => RoomEventType::SelfJoined,
            Self::OccupantJoined { .. } => RoomEventType::OccupantJoined,
            Self::OccupantUpdated { .. } => RoomEventType::OccupantUpdated,
            Self::OccupantLeft { .. } => RoomEventType::OccupantLeft,
            Self::RoomInfoReceived { .. } => RoomEventType::RoomInfoReceived,
            Self::MessageReceived { .. } => RoomEventType::MessageReceived,
            Self::LoggingEnabled => RoomEventType::LoggingEnabled,
            Self::LoggingDisabled => RoomEventType::LoggingDisabled,
            Self::RegistrationRequired { .. } => RoomEventType::RegistrationRequired,
            Self::NicknameConflict { .. } => RoomEventType::NicknameConflict,
            Self::PreSwitchToLobby => RoomEventType::PreSwitchToLobby,
            Self::PreSwitchToMain => RoomEventType::PreSwitchToMain,
            Self::SubjectChanged { .. } => RoomEventType::SubjectChanged,
            Self::ErrorReceived { .. } => RoomEventType::ErrorReceived,
            Self::RoomClosed { .. } => RoomEventType::RoomClosed,
        }
    }
}
