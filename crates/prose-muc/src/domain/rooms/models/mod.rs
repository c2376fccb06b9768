// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use muc_error::{MucError, MucErrorCondition, MucErrorPayload};
pub use occupant::{Occupant, OccupantStatus};
pub use occupant_update::{Actor, AffiliationUpdate, OccupantChange, RoleUpdate};
pub use role_privileges::{privileges_for_role, role_can, RolePrivilege};
pub use room::{Room, RoomClosedReason};
pub use room_affiliation::RoomAffiliation;
pub use room_config::RoomConfig;
pub use room_error::{RoomError, RoomOperationError, RoomValidationError};
pub use room_role::RoomRole;
pub use roster::{Roster, RosterInsertion};

mod muc_error;
mod occupant;
mod occupant_update;
pub mod role_privileges;
mod room;
mod room_affiliation;
mod room_config;
mod room_error;
mod room_role;
mod roster;
