// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use prose_muc::domain::rooms::models::{Occupant, OccupantStatus, Room, RoomAffiliation, RoomRole};
use prose_muc::test::{mock_data, EventRecorder};
use prose_muc::{AppDependencies, RoomEventBus, RoomSession};

mod channel_coordinator;
mod room_session;

pub fn occupant(nickname: &str, affiliation: RoomAffiliation, role: RoomRole) -> Occupant {
    Occupant::new(nickname, affiliation, role, OccupantStatus::available())
}

/// Returns a session for a room we've joined as `me`, together with a recorder that captures
/// the events published after setup.
pub fn joined_session(
    deps: &AppDependencies,
    me: Option<Occupant>,
    others: Vec<Occupant>,
) -> (RoomSession, EventRecorder) {
    let bus = RoomEventBus::new(mock_data::room_id());
    let room = Room::new(mock_data::room_id(), bus.clone());

    if let Some(me) = me {
        room.add_self_occupant(me);
    }
    for occupant in others {
        room.insert_occupant(occupant);
    }

    let recorder = EventRecorder::attach(&bus);
    (RoomSession::new(deps, room), recorder)
}
