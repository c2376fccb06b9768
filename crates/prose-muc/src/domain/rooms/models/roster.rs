// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;

use crate::domain::shared::models::Nickname;

use super::{
    Actor, AffiliationUpdate, Occupant, OccupantStatus, RoleUpdate, RoomAffiliation, RoomRole,
};

/// The occupants of a single room, keyed by nickname.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Roster {
    occupants: HashMap<Nickname, Occupant>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RosterInsertion {
    /// The nickname wasn't known before.
    Added(Occupant),
    /// An occupant with the same nickname existed already and has been updated.
    Updated(Occupant),
}

impl RosterInsertion {
    pub fn occupant(&self) -> &Occupant {
        match self {
            Self::Added(occupant) | Self::Updated(occupant) => occupant,
        }
    }
}

impl Roster {
    /// Inserts a new occupant or updates the existing occupant with the same nickname. The real id
    /// of an existing occupant is kept.
    pub fn add_occupant(
        &mut self,
        nickname: &Nickname,
        affiliation: RoomAffiliation,
        role: RoomRole,
        status: OccupantStatus,
    ) -> RosterInsertion {
        if let Some(occupant) = self.occupants.get_mut(nickname) {
            occupant.affiliation = affiliation;
            occupant.role = role;
            occupant.status = status;
            return RosterInsertion::Updated(occupant.clone());
        }

        let occupant = Occupant::new(nickname.clone(), affiliation, role, status);
        self.occupants.insert(nickname.clone(), occupant.clone());
        RosterInsertion::Added(occupant)
    }

    /// Inserts `occupant`, replacing any occupant with the same nickname.
    pub fn insert(&mut self, occupant: Occupant) -> RosterInsertion {
        match self
            .occupants
            .insert(occupant.nickname.clone(), occupant.clone())
        {
            Some(_) => RosterInsertion::Updated(occupant),
            None => RosterInsertion::Added(occupant),
        }
    }

    /// Removes the occupant. Returns `None` if the nickname wasn't known.
    pub fn remove_occupant(&mut self, nickname: &Nickname) -> Option<Occupant> {
        self.occupants.remove(nickname)
    }

    /// Replaces the occupant's affiliation. Returns `None` if the nickname isn't known.
    pub fn update_affiliation(
        &mut self,
        nickname: &Nickname,
        affiliation: RoomAffiliation,
        reason: Option<String>,
        actor: Option<Actor>,
    ) -> Option<AffiliationUpdate> {
        let occupant = self.occupants.get_mut(nickname)?;
        let previous = std::mem::replace(&mut occupant.affiliation, affiliation);

        Some(AffiliationUpdate {
            nickname: nickname.clone(),
            reason,
            new: affiliation,
            previous,
            actor,
        })
    }

    /// Replaces the occupant's role. Returns `None` if the nickname isn't known.
    pub fn update_role(
        &mut self,
        nickname: &Nickname,
        role: RoomRole,
        reason: Option<String>,
        actor: Option<Actor>,
    ) -> Option<RoleUpdate> {
        let occupant = self.occupants.get_mut(nickname)?;
        let previous = std::mem::replace(&mut occupant.role, role);

        Some(RoleUpdate {
            nickname: nickname.clone(),
            reason,
            new: role,
            previous,
            actor,
        })
    }

    pub fn get(&self, nickname: &Nickname) -> Option<&Occupant> {
        self.occupants.get(nickname)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occupant> {
        self.occupants.values()
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn clear(&mut self) {
        self.occupants.clear()
    }
}
