// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use anyhow::Result;
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use prose_muc::app::event_handlers::{RoomEvent, RoomServerEventType};
use prose_muc::domain::rooms::models::{Room, RoomAffiliation, RoomError, RoomRole};
use prose_muc::domain::rooms::services::mocks::{
    MockRoomManagementService, MockRoomOperationBackend,
};
use prose_muc::domain::rooms::services::RoomOperationHandle;
use prose_muc::domain::shared::models::Nickname;
use prose_muc::test::{mock_data, EventRecorder};
use prose_muc::{
    AppContext, AppDependencies, ChannelCoordinator, Coordinator, RoomEventBus, RoomOpState,
    RoomSession, TaskRoomOperationBackend,
};

use super::occupant;

/// Resolves once every task submitted to `coordinator` before has run.
async fn drain(coordinator: &dyn Coordinator) {
    let (tx, rx) = oneshot::channel();
    coordinator.run(Box::new(move || {
        _ = tx.send(());
    }));
    _ = rx.await;
}

#[tokio::test]
async fn test_kick_through_task_backend_and_coordinator_loop() -> Result<()> {
    let mut service = MockRoomManagementService::new();
    service
        .expect_set_role()
        .once()
        .return_once(|_, _, _, _| Box::pin(async { Ok(()) }));

    let (coordinator, coordinator_loop) = ChannelCoordinator::new();
    let cancel_token = CancellationToken::new();
    let loop_handle = coordinator_loop.spawn(cancel_token.clone());

    let coordinator = Arc::new(coordinator);
    let deps = AppDependencies {
        ctx: Arc::new(AppContext::default()),
        runtime: Handle::current(),
        coordinator: coordinator.clone(),
        room_operation_backend: Arc::new(TaskRoomOperationBackend::new(
            Arc::new(service),
            Handle::current(),
        )),
    };

    let bus = RoomEventBus::new(mock_data::room_id());
    let room = Room::new(mock_data::room_id(), bus.clone());
    let session = RoomSession::new(&deps, room);

    // Server events are applied on the coordinator as well.
    session.handle_server_event(RoomServerEventType::SelfPresence {
        occupant: occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator),
    });
    session.handle_server_event(RoomServerEventType::OccupantPresence {
        occupant: occupant("bob", RoomAffiliation::None, RoomRole::Participant),
    });
    drain(coordinator.as_ref()).await;
    assert_eq!(session.room().occupants_count(), 2);

    let recorder = EventRecorder::attach(&bus);

    let state = session
        .kick_occupant(&Nickname::from("bob"), Some("Spam".to_string()))?
        .wait()
        .await;
    assert_eq!(state, RoomOpState::Succeeded);

    drain(coordinator.as_ref()).await;

    assert_eq!(session.room().occupant(&Nickname::from("bob")), None);
    assert_eq!(
        recorder.events(),
        vec![RoomEvent::OccupantLeft {
            occupant: occupant("bob", RoomAffiliation::None, RoomRole::Participant)
        }]
    );

    cancel_token.cancel();
    loop_handle.await?;

    Ok(())
}

#[tokio::test]
async fn test_operation_key_is_held_until_coordinator_applied_result() -> Result<()> {
    let mut backend = MockRoomOperationBackend::new();
    backend
        .expect_start_operation()
        .times(2)
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (coordinator, coordinator_loop) = ChannelCoordinator::new();
    let coordinator = Arc::new(coordinator);
    let deps = AppDependencies {
        ctx: Arc::new(AppContext::default()),
        runtime: Handle::current(),
        coordinator: coordinator.clone(),
        room_operation_backend: Arc::new(backend),
    };

    let bus = RoomEventBus::new(mock_data::room_id());
    let room = Room::new(mock_data::room_id(), bus);
    room.add_self_occupant(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator));
    room.insert_occupant(occupant("bob", RoomAffiliation::None, RoomRole::Participant));
    let session = RoomSession::new(&deps, room);

    let bob = Nickname::from("bob");
    let operation = session.update_occupant_role(&bob, RoomRole::Visitor, None)?;
    let cancel_handle = operation.cancel_handle();

    while cancel_handle.state() != RoomOpState::Succeeded {
        tokio::task::yield_now().await;
    }

    // The backend reported success but the coordinator hasn't run yet.
    assert_eq!(
        session.room().occupant(&bob).map(|o| o.role),
        Some(RoomRole::Participant)
    );
    assert_eq!(session.active_operations_count(), 1);
    assert!(matches!(
        session.update_occupant_role(&bob, RoomRole::Visitor, None),
        Err(RoomError::OperationInProgress { .. })
    ));

    let cancel_token = CancellationToken::new();
    let loop_handle = coordinator_loop.spawn(cancel_token.clone());

    assert_eq!(operation.wait().await, RoomOpState::Succeeded);
    assert_eq!(
        session.room().occupant(&bob).map(|o| o.role),
        Some(RoomRole::Visitor)
    );
    assert_eq!(session.active_operations_count(), 0);

    // Retrying is possible now.
    let retry = session.update_occupant_role(&bob, RoomRole::Participant, None)?;
    assert_eq!(retry.wait().await, RoomOpState::Succeeded);

    cancel_token.cancel();
    loop_handle.await?;

    Ok(())
}
