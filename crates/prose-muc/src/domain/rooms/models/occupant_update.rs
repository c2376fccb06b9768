// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::shared::models::Nickname;

use super::{Occupant, RoomAffiliation, RoomRole};

/// The occupant who caused an affiliation or role change.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub nickname: Nickname,
    pub affiliation: RoomAffiliation,
    pub role: RoomRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffiliationUpdate {
    pub nickname: Nickname,
    pub reason: Option<String>,
    pub new: RoomAffiliation,
    pub previous: RoomAffiliation,
    pub actor: Option<Actor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleUpdate {
    pub nickname: Nickname,
    pub reason: Option<String>,
    pub new: RoomRole,
    pub previous: RoomRole,
    pub actor: Option<Actor>,
}

/// Describes why an occupant's entry in the roster changed.
#[derive(Debug, Clone, PartialEq)]
pub enum OccupantChange {
    Presence,
    Affiliation(AffiliationUpdate),
    Role(RoleUpdate),
}

impl From<Occupant> for Actor {
    fn from(value: Occupant) -> Self {
        Actor {
            nickname: value.nickname,
            affiliation: value.affiliation,
            role: value.role,
        }
    }
}
