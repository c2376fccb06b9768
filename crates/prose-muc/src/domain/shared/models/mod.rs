// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use availability::Availability;
pub use nickname::Nickname;
pub use room_id::RoomId;
pub use subscriber_id::SubscriberId;
pub use user_id::UserId;

mod availability;
mod nickname;
mod room_id;
mod subscriber_id;
mod user_id;
