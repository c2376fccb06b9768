// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::util::id_string;

id_string!(
    /// Identifies a subscription on a room's event bus. Unique per event type.
    SubscriberId
);
