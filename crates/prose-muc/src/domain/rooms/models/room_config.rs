// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

/// A snapshot of the room's configuration as advertised by the MUC service (XEP-0045, 6.4).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    /// Real JIDs of occupants are visible to everyone.
    pub is_non_anonymous: bool,
    pub is_members_only: bool,
    pub is_moderated: bool,
    pub is_password_protected: bool,
    pub is_persistent: bool,
    pub is_public: bool,
    /// Messages are archived publicly.
    pub is_logged: bool,
    pub max_occupants: Option<u32>,
}
