// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use strum_macros::{Display, EnumIter};

use super::RoomRole;

/// Things an occupant may do in a room depending on their role (XEP-0045, 5.1.1).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum RolePrivilege {
    PresentInRoom,
    ReceiveMessages,
    ReceiveOccupantPresence,
    BroadcastPresence,
    ChangeAvailabilityStatus,
    ChangeRoomNickname,
    SendPrivateMessages,
    InviteOtherUsers,
    SendMessagesToAll,
    ModifySubject,
    KickParticipantsAndVisitors,
    GrantVoice,
    RevokeVoice,
}

const VISITOR_PRIVILEGES: [RolePrivilege; 8] = [
    RolePrivilege::PresentInRoom,
    RolePrivilege::ReceiveMessages,
    RolePrivilege::ReceiveOccupantPresence,
    RolePrivilege::BroadcastPresence,
    RolePrivilege::ChangeAvailabilityStatus,
    RolePrivilege::ChangeRoomNickname,
    RolePrivilege::SendPrivateMessages,
    RolePrivilege::InviteOtherUsers,
];

const PARTICIPANT_PRIVILEGES: [RolePrivilege; 2] = [
    RolePrivilege::SendMessagesToAll,
    RolePrivilege::ModifySubject,
];

const MODERATOR_PRIVILEGES: [RolePrivilege; 3] = [
    RolePrivilege::KickParticipantsAndVisitors,
    RolePrivilege::GrantVoice,
    RolePrivilege::RevokeVoice,
];

static ROLE_PRIVILEGES: Lazy<HashMap<RoomRole, HashSet<RolePrivilege>>> = Lazy::new(|| {
    let visitor = HashSet::from(VISITOR_PRIVILEGES);
    let participant = visitor
        .iter()
        .copied()
        .chain(PARTICIPANT_PRIVILEGES)
        .collect::<HashSet<_>>();
    let moderator = participant
        .iter()
        .copied()
        .chain(MODERATOR_PRIVILEGES)
        .collect::<HashSet<_>>();

    HashMap::from([
        (RoomRole::None, HashSet::new()),
        (RoomRole::Visitor, visitor),
        (RoomRole::Participant, participant),
        (RoomRole::Moderator, moderator),
    ])
});

static NO_PRIVILEGES: Lazy<HashSet<RolePrivilege>> = Lazy::new(HashSet::new);

/// Returns the privileges granted to `role`. Roles missing from the table have none.
pub fn privileges_for_role(role: &RoomRole) -> &'static HashSet<RolePrivilege> {
    ROLE_PRIVILEGES.get(role).unwrap_or(&NO_PRIVILEGES)
}

pub fn role_can(privilege: RolePrivilege, role: &RoomRole) -> bool {
    privileges_for_role(role).contains(&privilege)
}
