// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::app::event_handlers::{RoomEvent, RoomEventBus};
use crate::domain::shared::models::{Nickname, RoomId};

use super::{
    Actor, AffiliationUpdate, Occupant, OccupantChange, OccupantStatus, RoleUpdate, RoomAffiliation,
    RoomConfig, RoomError, RoomRole, Roster, RosterInsertion,
};

/// Why our user is no longer part of a room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomClosedReason {
    /// We left the room.
    Left,
    /// The room was destroyed, optionally pointing to a replacement.
    Destroyed {
        alternative_room_id: Option<RoomId>,
        reason: Option<String>,
    },
    /// We were kicked from the room.
    Kicked { reason: Option<String> },
    /// We were banned from the room.
    Banned { reason: Option<String> },
}

/// A MUC room our user is (or was) part of.
///
/// `Room` is cheap to clone. All clones share the same state. Every mutation publishes the matching
/// event on the room's event bus after the internal lock has been released so that subscribers
/// can read the room again.
#[derive(Clone)]
pub struct Room {
    inner: Arc<RoomInner>,
}

struct RoomInner {
    room_id: RoomId,
    event_bus: RoomEventBus,
    details: RwLock<RoomDetails>,
}

enum RosterChange {
    Updated(Occupant),
    Removed(Occupant),
}

#[derive(Debug, Clone, Default)]
struct RoomDetails {
    roster: Roster,
    self_nickname: Option<Nickname>,
    subject: Option<String>,
    config: RoomConfig,
    is_open: bool,
}

impl Room {
    pub fn new(room_id: RoomId, event_bus: RoomEventBus) -> Self {
        Self {
            inner: Arc::new(RoomInner {
                room_id,
                event_bus,
                details: RwLock::new(RoomDetails {
                    is_open: true,
                    ..Default::default()
                }),
            }),
        }
    }
}

impl Room {
    pub fn room_id(&self) -> &RoomId {
        &self.inner.room_id
    }

    pub fn event_bus(&self) -> &RoomEventBus {
        &self.inner.event_bus
    }

    pub fn is_open(&self) -> bool {
        self.inner.details.read().is_open
    }

    pub fn self_nickname(&self) -> Option<Nickname> {
        self.inner.details.read().self_nickname.clone()
    }

    /// Our own occupant, looked up by our nickname.
    pub fn self_occupant(&self) -> Option<Occupant> {
        let details = self.inner.details.read();
        let nickname = details.self_nickname.as_ref()?;
        details.roster.get(nickname).cloned()
    }

    pub fn occupant(&self, nickname: &Nickname) -> Option<Occupant> {
        self.inner.details.read().roster.get(nickname).cloned()
    }

    pub fn occupants(&self) -> Vec<Occupant> {
        self.inner.details.read().roster.iter().cloned().collect()
    }

    pub fn occupants_count(&self) -> usize {
        self.inner.details.read().roster.len()
    }

    pub fn subject(&self) -> Option<String> {
        self.inner.details.read().subject.clone()
    }

    pub fn config(&self) -> RoomConfig {
        self.inner.details.read().config.clone()
    }
}

impl Room {
    /// Records the nickname we're joined under and reopens a previously closed room.
    pub fn set_self_nickname(&self, nickname: Nickname) {
        let mut details = self.inner.details.write();
        details.self_nickname = Some(nickname);
        details.is_open = true;
    }

    /// Inserts or updates our own occupant and publishes `SelfJoined`.
    pub fn add_self_occupant(&self, occupant: Occupant) {
        {
            let mut details = self.inner.details.write();
            details.self_nickname = Some(occupant.nickname.clone());
            details.is_open = true;
            details.roster.insert(occupant.clone());
        }
        self.publish(RoomEvent::SelfJoined { occupant });
    }

    /// Inserts a new occupant or updates the existing occupant with the same nickname.
    pub fn add_occupant(
        &self,
        nickname: &Nickname,
        affiliation: RoomAffiliation,
        role: RoomRole,
        status: OccupantStatus,
    ) -> RosterInsertion {
        let insertion = self
            .inner
            .details
            .write()
            .roster
            .add_occupant(nickname, affiliation, role, status);
        self.publish_insertion(&insertion);
        insertion
    }

    /// Inserts `occupant`, replacing any occupant with the same nickname.
    pub fn insert_occupant(&self, occupant: Occupant) -> RosterInsertion {
        let insertion = self.inner.details.write().roster.insert(occupant);
        self.publish_insertion(&insertion);
        insertion
    }

    /// Removes the occupant and publishes `OccupantLeft`. Returns `None` (and publishes nothing)
    /// if the nickname wasn't known.
    pub fn remove_occupant(&self, nickname: &Nickname) -> Option<Occupant> {
        let removed = self.inner.details.write().roster.remove_occupant(nickname);
        let Some(occupant) = removed else {
            debug!(
                room = %self.inner.room_id,
                "Ignoring removal of unknown occupant '{}'.",
                nickname
            );
            return None;
        };

        self.publish(RoomEvent::OccupantLeft {
            occupant: occupant.clone(),
        });
        Some(occupant)
    }

    /// Replaces the occupant's affiliation and publishes `OccupantUpdated`. Banning the occupant
    /// (`RoomAffiliation::Outcast`) removes them from the roster and publishes `OccupantLeft`
    /// instead. Nothing is published if the affiliation didn't change.
    pub fn update_affiliation(
        &self,
        nickname: &Nickname,
        affiliation: RoomAffiliation,
        reason: Option<String>,
        actor: Option<Actor>,
    ) -> Result<AffiliationUpdate, RoomError> {
        let (update, change) = {
            let mut details = self.inner.details.write();
            let update = details
                .roster
                .update_affiliation(nickname, affiliation, reason, actor)
                .ok_or_else(|| self.occupant_not_found(nickname))?;

            let change = if affiliation.is_banned() {
                details.roster.remove_occupant(nickname).map(RosterChange::Removed)
            } else if update.previous.is_different_from(&update.new) {
                details.roster.get(nickname).cloned().map(RosterChange::Updated)
            } else {
                None
            };
            (update, change)
        };

        match change {
            Some(RosterChange::Updated(occupant)) => self.publish(RoomEvent::OccupantUpdated {
                occupant,
                change: OccupantChange::Affiliation(update.clone()),
            }),
            Some(RosterChange::Removed(occupant)) => {
                self.publish(RoomEvent::OccupantLeft { occupant })
            }
            None => (),
        }
        Ok(update)
    }

    /// Replaces the occupant's role and publishes `OccupantUpdated`. Revoking the role
    /// (`RoomRole::None`) removes the occupant from the roster and publishes `OccupantLeft`
    /// instead. Nothing is published if the role didn't change.
    pub fn update_role(
        &self,
        nickname: &Nickname,
        role: RoomRole,
        reason: Option<String>,
        actor: Option<Actor>,
    ) -> Result<RoleUpdate, RoomError> {
        let (update, change) = {
            let mut details = self.inner.details.write();
            let update = details
                .roster
                .update_role(nickname, role, reason, actor)
                .ok_or_else(|| self.occupant_not_found(nickname))?;

            let change = if role.is_none() {
                details.roster.remove_occupant(nickname).map(RosterChange::Removed)
            } else if update.previous.is_different_from(&update.new) {
                details.roster.get(nickname).cloned().map(RosterChange::Updated)
            } else {
                None
            };
            (update, change)
        };

        match change {
            Some(RosterChange::Updated(occupant)) => self.publish(RoomEvent::OccupantUpdated {
                occupant,
                change: OccupantChange::Role(update.clone()),
            }),
            Some(RosterChange::Removed(occupant)) => {
                self.publish(RoomEvent::OccupantLeft { occupant })
            }
            None => (),
        }
        Ok(update)
    }

    pub fn set_subject(&self, subject: Option<String>) {
        self.inner.details.write().subject = subject.clone();
        self.publish(RoomEvent::SubjectChanged { subject });
    }

    /// Replaces the configuration snapshot. Publishes `RoomInfoReceived` and, if the logging
    /// setting flipped, `LoggingEnabled` or `LoggingDisabled`.
    pub fn set_config(&self, config: RoomConfig) {
        let was_logged = {
            let mut details = self.inner.details.write();
            std::mem::replace(&mut details.config, config.clone()).is_logged
        };
        let is_logged = config.is_logged;

        self.publish(RoomEvent::RoomInfoReceived { config });

        match (was_logged, is_logged) {
            (false, true) => self.publish(RoomEvent::LoggingEnabled),
            (true, false) => self.publish(RoomEvent::LoggingDisabled),
            _ => (),
        }
    }

    /// Sets the logging flag of the configuration snapshot without replacing the rest of it.
    pub fn set_logging_enabled(&self, is_enabled: bool) {
        {
            let mut details = self.inner.details.write();
            if details.config.is_logged == is_enabled {
                return;
            }
            details.config.is_logged = is_enabled;
        }

        self.publish(if is_enabled {
            RoomEvent::LoggingEnabled
        } else {
            RoomEvent::LoggingDisabled
        });
    }

    /// Clears the roster, forgets our nickname and publishes `RoomClosed`. Closing a room that is
    /// closed already does nothing.
    pub fn close(&self, reason: RoomClosedReason) {
        {
            let mut details = self.inner.details.write();
            if !details.is_open {
                return;
            }
            details.is_open = false;
            details.self_nickname = None;
            details.roster.clear();
        }

        self.publish(RoomEvent::RoomClosed { reason });
    }
}

impl Room {
    fn publish(&self, event: RoomEvent) {
        self.inner.event_bus.publish(&event)
    }

    fn publish_insertion(&self, insertion: &RosterInsertion) {
        let event = match insertion {
            RosterInsertion::Added(occupant) => RoomEvent::OccupantJoined {
                occupant: occupant.clone(),
            },
            RosterInsertion::Updated(occupant) => RoomEvent::OccupantUpdated {
                occupant: occupant.clone(),
                change: OccupantChange::Presence,
            },
        };
        self.publish(event)
    }

    fn occupant_not_found(&self, nickname: &Nickname) -> RoomError {
        RoomError::OccupantNotFound {
            room_id: self.inner.room_id.clone(),
            nickname: nickname.clone(),
        }
    }
}

impl Debug for Room {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let details = self.inner.details.read();
        f.debug_struct("Room")
            .field("room_id", &self.inner.room_id)
            .field("self_nickname", &details.self_nickname)
            .field("occupants", &details.roster.len())
            .field("is_open", &details.is_open)
            .finish()
    }
}

impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
