// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use super::RoomValidationError;

/// The session-scoped capability grade of an occupant within a room (XEP-0045, 5.1). Roles are
/// reset whenever an occupant rejoins.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    Moderator,
    Participant,
    Visitor,
    #[default]
    None,
}

impl RoomRole {
    pub fn is_moderator(&self) -> bool {
        matches!(self, Self::Moderator)
    }

    pub fn is_participant(&self) -> bool {
        matches!(self, Self::Participant)
    }

    pub fn is_visitor(&self) -> bool {
        matches!(self, Self::Visitor)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Participants and moderators may speak in moderated rooms.
    pub fn has_voice(&self) -> bool {
        matches!(self, Self::Participant | Self::Moderator)
    }

    pub fn is_different_from(&self, other: &RoomRole) -> bool {
        self != other
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Visitor => "visitor",
            Self::Participant => "participant",
            Self::Moderator => "moderator",
        }
    }
}

impl FromStr for RoomRole {
    type Err = RoomValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "visitor" => Ok(Self::Visitor),
            "participant" => Ok(Self::Participant),
            "moderator" => Ok(Self::Moderator),
            _ => Err(RoomValidationError::UnknownRole(s.to_string())),
        }
    }
}

impl Display for RoomRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
