// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use super::RoomValidationError;

/// The long-lived membership grade of a user relative to a room (XEP-0045, 5.2).
///
/// Affiliations are values. An occupant's affiliation is replaced wholesale when it changes.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomAffiliation {
    /// The user who created the room, or who got appointed by its creator
    /// to be their equal.
    Owner,

    /// A user who has been empowered by an owner to do administrative
    /// operations.
    Admin,

    /// A user who is whitelisted to speak in moderated rooms, or to join a
    /// member-only room.
    Member,

    /// A user who has been banned from this room.
    Outcast,

    /// A normal participant.
    #[default]
    None,
}

impl RoomAffiliation {
    /// True only for `Admin`. Owners are not reported as admins.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn is_banned(&self) -> bool {
        matches!(self, Self::Outcast)
    }

    /// Admins and owners are members too.
    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member | Self::Admin | Self::Owner)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Outcast => "outcast",
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Returns true if `self` ranks below `other`.
    ///
    /// This is not a consistent order: `Outcast` is lower than everything (including itself) while
    /// `None` is lower than everything that isn't `None`, so `None` and `Outcast` are both lower
    /// than each other.
    pub fn is_lower_than(&self, other: &RoomAffiliation) -> bool {
        match self {
            Self::None => !other.is_none(),
            Self::Outcast => true,
            Self::Member => other.is_admin() || other.is_owner(),
            Self::Admin => other.is_owner(),
            Self::Owner => false,
        }
    }

    /// Returns true if `other` should be treated as a different affiliation than `self`.
    pub fn is_different_from(&self, other: &RoomAffiliation) -> bool {
        match self {
            Self::None => !other.is_none(),
            Self::Outcast => !other.is_banned(),
            // Admins and owners are members as well, but they're still a different affiliation.
            Self::Member => !other.is_member() || other.is_admin() || other.is_owner(),
            Self::Admin => !other.is_admin(),
            Self::Owner => !other.is_owner(),
        }
    }
}

impl FromStr for RoomAffiliation {
    type Err = RoomValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "outcast" => Ok(Self::Outcast),
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            _ => Err(RoomValidationError::UnknownAffiliation(s.to_string())),
        }
    }
}

impl Display for RoomAffiliation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
