// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::shared::models::{Availability, Nickname, UserId};

use super::role_privileges::{role_can, RolePrivilege};
use super::{RoomAffiliation, RoomRole};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OccupantStatus {
    pub availability: Availability,
    pub message: Option<String>,
}

impl OccupantStatus {
    pub fn available() -> Self {
        Self {
            availability: Availability::Available,
            message: None,
        }
    }
}

/// A participant's presence in a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub nickname: Nickname,
    /// The real JID of the occupant. Only available in non-anonymous rooms or if our user is
    /// privileged enough to see it.
    pub real_id: Option<UserId>,
    pub affiliation: RoomAffiliation,
    pub role: RoomRole,
    pub status: OccupantStatus,
}

impl Occupant {
    pub fn new(
        nickname: impl Into<Nickname>,
        affiliation: RoomAffiliation,
        role: RoomRole,
        status: OccupantStatus,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            real_id: None,
            affiliation,
            role,
            status,
        }
    }

    pub fn set_real_id(mut self, real_id: &UserId) -> Self {
        self.real_id = Some(real_id.clone());
        self
    }
}

// Role based privileges
impl Occupant {
    fn role_has_privilege(&self, privilege: RolePrivilege) -> bool {
        role_can(privilege, &self.role)
    }

    pub fn can_present_in_room(&self) -> bool {
        self.role_has_privilege(RolePrivilege::PresentInRoom)
    }

    pub fn can_receive_messages(&self) -> bool {
        self.role_has_privilege(RolePrivilege::ReceiveMessages)
    }

    pub fn can_receive_occupant_presence(&self) -> bool {
        self.role_has_privilege(RolePrivilege::ReceiveOccupantPresence)
    }

    pub fn can_broadcast_presence_to_all_occupants(&self) -> bool {
        self.role_has_privilege(RolePrivilege::BroadcastPresence)
    }

    pub fn can_change_availability_status(&self) -> bool {
        self.role_has_privilege(RolePrivilege::ChangeAvailabilityStatus)
    }

    pub fn can_change_room_nickname(&self) -> bool {
        self.role_has_privilege(RolePrivilege::ChangeRoomNickname)
    }

    pub fn can_send_private_messages(&self) -> bool {
        self.role_has_privilege(RolePrivilege::SendPrivateMessages)
    }

    /// Checks `SendPrivateMessages` instead of `InviteOtherUsers`. Both are granted to exactly the
    /// same roles, so the outcome is identical today. Kept until the intended privilege is
    /// confirmed.
    pub fn can_invite_other_users(&self) -> bool {
        self.role_has_privilege(RolePrivilege::SendPrivateMessages)
    }

    pub fn can_send_messages_to_all(&self) -> bool {
        self.role_has_privilege(RolePrivilege::SendMessagesToAll)
    }

    pub fn can_modify_subject(&self) -> bool {
        self.role_has_privilege(RolePrivilege::ModifySubject)
    }

    pub fn can_kick_participants_and_visitors(&self) -> bool {
        self.role_has_privilege(RolePrivilege::KickParticipantsAndVisitors)
    }

    pub fn can_grant_voice(&self) -> bool {
        self.role_has_privilege(RolePrivilege::GrantVoice)
    }
}

// Affiliation based privileges
impl Occupant {
    pub fn can_enter_open_room(&self) -> bool {
        !self.affiliation.is_banned()
    }

    pub fn can_register_with_open_room(&self) -> bool {
        self.affiliation.is_none()
    }

    pub fn can_retrieve_member_list(&self) -> bool {
        self.affiliation.is_member()
    }

    pub fn can_enter_members_only_room(&self) -> bool {
        self.affiliation.is_member()
    }

    pub fn can_ban_members_and_unaffiliated_users(&self) -> bool {
        self.is_admin_or_owner()
    }

    pub fn can_edit_member_list(&self) -> bool {
        self.is_admin_or_owner()
    }

    pub fn can_assign_and_remove_moderator_role(&self) -> bool {
        self.is_admin_or_owner()
    }

    pub fn can_edit_admin_list(&self) -> bool {
        self.affiliation.is_owner()
    }

    pub fn can_edit_owner_list(&self) -> bool {
        self.affiliation.is_owner()
    }

    pub fn can_change_room_configuration(&self) -> bool {
        self.affiliation.is_owner()
    }

    pub fn can_destroy_room(&self) -> bool {
        self.affiliation.is_owner()
    }

    fn is_admin_or_owner(&self) -> bool {
        self.affiliation.is_admin() || self.affiliation.is_owner()
    }
}

// Privileges over another occupant
impl Occupant {
    pub fn can_revoke_voice(&self, target: &Occupant) -> bool {
        if target.is_admin_or_owner() {
            return false;
        }
        self.role.is_moderator()
    }

    pub fn can_change_role(&self, target: &Occupant) -> bool {
        if target.is_admin_or_owner() {
            return false;
        }
        self.is_admin_or_owner() && target.affiliation.is_lower_than(&self.affiliation)
    }

    pub fn can_change_affiliation(&self, target: &Occupant) -> bool {
        self.is_admin_or_owner() && target.affiliation.is_lower_than(&self.affiliation)
    }

    pub fn can_kick_occupant(&self, target: &Occupant) -> bool {
        self.role.is_moderator()
            && (target.role.is_participant() || target.role.is_visitor())
            && target.affiliation.is_lower_than(&self.affiliation)
    }
}
