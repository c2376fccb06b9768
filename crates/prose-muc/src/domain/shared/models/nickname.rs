// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::util::id_string;

id_string!(
    /// The name under which an occupant is known within a room. Unique within a room's roster.
    Nickname
);
