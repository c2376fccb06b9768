// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mockall::predicate;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;

use prose_muc::app::event_handlers::RoomEvent;
use prose_muc::domain::rooms::models::{
    Actor, AffiliationUpdate, MucError, OccupantChange, RoomAffiliation, RoomClosedReason,
    RoomError, RoomOperationError, RoomRole,
};
use prose_muc::domain::rooms::services::{
    RoomOperationHandle, RoomOperationRequest, RoomOperationResult,
};
use prose_muc::domain::shared::models::{Nickname, RoomId};
use prose_muc::room_id;
use prose_muc::test::{mock_data, MockAppDependencies};
use prose_muc::RoomOpState;

use super::{joined_session, occupant};

type PendingResults = Arc<Mutex<Vec<oneshot::Sender<RoomOperationResult>>>>;

/// Makes the backend return handles that stay pending until the test resolves them through the
/// returned senders.
fn expect_pending_operations(deps: &mut MockAppDependencies, times: usize) -> PendingResults {
    let senders = PendingResults::default();
    let s = senders.clone();

    deps.room_operation_backend
        .expect_start_operation()
        .times(times)
        .returning(move |_, _| {
            let (tx, handle) = RoomOperationHandle::channel();
            s.lock().push(tx);
            handle
        });

    senders
}

#[tokio::test]
async fn test_join_records_self_nickname() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .with(
            predicate::eq(mock_data::room_id()),
            predicate::eq(RoomOperationRequest::Join {
                nickname: Nickname::from("jane"),
                password: Some("secret".to_string()),
            }),
        )
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, _) = joined_session(&deps.into_deps(), None, vec![]);

    let state = session.join("jane", Some("secret".to_string()))?.wait().await;

    assert_eq!(state, RoomOpState::Succeeded);
    assert_eq!(session.room().self_nickname(), Some(Nickname::from("jane")));
    assert_eq!(session.active_operations_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_join_conflict_publishes_nickname_conflict() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    let error = MucError::Conflict {
        room_id: mock_data::room_id(),
        text: None,
    };

    {
        let error = error.clone();
        deps.room_operation_backend
            .expect_start_operation()
            .once()
            .returning(move |_, _| {
                RoomOperationHandle::resolved(Err(RoomOperationError::Muc(error.clone())))
            });
    }

    let (session, recorder) = joined_session(&deps.into_deps(), None, vec![]);

    let state = session.join("jane", None)?.wait().await;

    assert_eq!(state, RoomOpState::Failed);
    assert_eq!(session.room().self_nickname(), None);
    assert_eq!(
        recorder.events(),
        vec![
            RoomEvent::ErrorReceived { error },
            RoomEvent::NicknameConflict {
                nickname: Some(Nickname::from("jane"))
            }
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_join_registration_required_publishes_event() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .returning(|_, _| {
            RoomOperationHandle::resolved(Err(RoomOperationError::Muc(
                MucError::RegistrationRequired {
                    room_id: mock_data::room_id(),
                    text: Some("Members only".to_string()),
                },
            )))
        });

    let (session, recorder) = joined_session(&deps.into_deps(), None, vec![]);
    session.join("jane", None)?.wait().await;

    assert_eq!(
        recorder.event_types(),
        vec![
            prose_muc::RoomEventType::ErrorReceived,
            prose_muc::RoomEventType::RegistrationRequired
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_leave_closes_room() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .with(
            predicate::always(),
            predicate::eq(RoomOperationRequest::Leave {
                nickname: Nickname::from("jane"),
            }),
        )
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Member, RoomRole::Participant)),
        vec![occupant("bob", RoomAffiliation::None, RoomRole::Participant)],
    );

    assert_eq!(session.leave()?.wait().await, RoomOpState::Succeeded);

    assert!(!session.room().is_open());
    assert_eq!(session.room().occupants_count(), 0);
    assert_eq!(
        recorder.events(),
        vec![RoomEvent::RoomClosed {
            reason: RoomClosedReason::Left
        }]
    );

    // The room is closed now.
    assert!(matches!(session.leave(), Err(RoomError::RoomIsClosed(_))));

    Ok(())
}

#[tokio::test]
async fn test_leave_requires_joined_room() {
    let mut deps = MockAppDependencies::default();
    deps.room_operation_backend.expect_start_operation().never();

    let (session, _) = joined_session(&deps.into_deps(), None, vec![]);

    assert!(matches!(session.leave(), Err(RoomError::NotJoined(_))));
}

#[tokio::test]
async fn test_admin_cannot_destroy_room() {
    let mut deps = MockAppDependencies::default();
    deps.room_operation_backend.expect_start_operation().never();

    let (session, _) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Admin, RoomRole::Moderator)),
        vec![],
    );

    let result = session.destroy(None, None);
    assert!(matches!(result, Err(RoomError::NotAllowed { .. })));
}

#[tokio::test]
async fn test_owner_destroys_room() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    let alternative_room_id = room_id!("new-room@conference.prose.org");

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .with(
            predicate::always(),
            predicate::eq(RoomOperationRequest::Destroy {
                alternative_room_id: Some(alternative_room_id.clone()),
                reason: Some("Moving".to_string()),
            }),
        )
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![],
    );

    let state = session
        .destroy(Some(alternative_room_id.clone()), Some("Moving".to_string()))?
        .wait()
        .await;

    assert_eq!(state, RoomOpState::Succeeded);
    assert_eq!(
        recorder.events(),
        vec![RoomEvent::RoomClosed {
            reason: RoomClosedReason::Destroyed {
                alternative_room_id: Some(alternative_room_id),
                reason: Some("Moving".to_string())
            }
        }]
    );

    Ok(())
}

#[tokio::test]
async fn test_update_affiliation_applies_change_on_success() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .with(
            predicate::always(),
            predicate::eq(RoomOperationRequest::SetAffiliation {
                nickname: Nickname::from("bob"),
                affiliation: RoomAffiliation::Member,
                reason: Some("Welcome".to_string()),
            }),
        )
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![occupant("bob", RoomAffiliation::None, RoomRole::Participant)],
    );

    let state = session
        .update_occupant_affiliation(
            &Nickname::from("bob"),
            RoomAffiliation::Member,
            Some("Welcome".to_string()),
        )?
        .wait()
        .await;

    assert_eq!(state, RoomOpState::Succeeded);
    assert_eq!(
        recorder.events(),
        vec![RoomEvent::OccupantUpdated {
            occupant: occupant("bob", RoomAffiliation::Member, RoomRole::Participant),
            change: OccupantChange::Affiliation(AffiliationUpdate {
                nickname: Nickname::from("bob"),
                reason: Some("Welcome".to_string()),
                new: RoomAffiliation::Member,
                previous: RoomAffiliation::None,
                actor: Some(Actor {
                    nickname: Nickname::from("jane"),
                    affiliation: RoomAffiliation::Owner,
                    role: RoomRole::Moderator,
                }),
            })
        }]
    );

    Ok(())
}

#[tokio::test]
async fn test_member_cannot_change_affiliations() {
    let mut deps = MockAppDependencies::default();
    deps.room_operation_backend.expect_start_operation().never();

    let (session, _) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Member, RoomRole::Participant)),
        vec![occupant("bob", RoomAffiliation::None, RoomRole::Participant)],
    );

    let result =
        session.update_occupant_affiliation(&Nickname::from("bob"), RoomAffiliation::Member, None);
    assert!(matches!(result, Err(RoomError::NotAllowed { .. })));
}

#[tokio::test]
async fn test_update_affiliation_of_unknown_occupant_fails() {
    let mut deps = MockAppDependencies::default();
    deps.room_operation_backend.expect_start_operation().never();

    let (session, _) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![],
    );

    let result =
        session.update_occupant_affiliation(&Nickname::from("bob"), RoomAffiliation::Member, None);
    assert!(matches!(result, Err(RoomError::OccupantNotFound { .. })));
}

#[tokio::test]
async fn test_update_role_failure_leaves_roster_untouched() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .returning(|_, _| {
            RoomOperationHandle::resolved(Err(RoomOperationError::Generic {
                msg: "Server error".to_string(),
            }))
        });

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Admin, RoomRole::Moderator)),
        vec![occupant("bob", RoomAffiliation::Member, RoomRole::Participant)],
    );

    let state = session
        .update_occupant_role(&Nickname::from("bob"), RoomRole::Visitor, None)?
        .wait()
        .await;

    assert_eq!(state, RoomOpState::Failed);
    assert_eq!(
        session.room().occupant(&Nickname::from("bob")).map(|o| o.role),
        Some(RoomRole::Participant)
    );
    // Only protocol errors are published.
    assert!(recorder.events().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_kick_removes_occupant() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .with(
            predicate::always(),
            predicate::eq(RoomOperationRequest::SetRole {
                nickname: Nickname::from("bob"),
                role: RoomRole::None,
                reason: None,
            }),
        )
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![occupant("bob", RoomAffiliation::None, RoomRole::Participant)],
    );

    let state = session
        .kick_occupant(&Nickname::from("bob"), None)?
        .wait()
        .await;

    assert_eq!(state, RoomOpState::Succeeded);
    assert_eq!(session.room().occupant(&Nickname::from("bob")), None);
    assert_eq!(
        recorder.events(),
        vec![RoomEvent::OccupantLeft {
            occupant: occupant("bob", RoomAffiliation::None, RoomRole::Participant)
        }]
    );

    Ok(())
}

#[tokio::test]
async fn test_cannot_kick_moderators() {
    let mut deps = MockAppDependencies::default();
    deps.room_operation_backend.expect_start_operation().never();

    let (session, _) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![occupant("bob", RoomAffiliation::Admin, RoomRole::Moderator)],
    );

    let result = session.kick_occupant(&Nickname::from("bob"), None);
    assert!(matches!(result, Err(RoomError::NotAllowed { .. })));
}

#[tokio::test]
async fn test_rejects_duplicate_operation_until_first_completes() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    let senders = expect_pending_operations(&mut deps, 2);

    let (session, _) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![
            occupant("bob", RoomAffiliation::None, RoomRole::Participant),
            occupant("alice", RoomAffiliation::None, RoomRole::Participant),
        ],
    );

    let bob = Nickname::from("bob");
    let first = session.update_occupant_role(&bob, RoomRole::Visitor, None)?;

    let Err(RoomError::OperationInProgress { operation, .. }) =
        session.update_occupant_role(&bob, RoomRole::Visitor, None)
    else {
        panic!("Expected RoomError::OperationInProgress")
    };
    assert_eq!(operation, "update-role");

    // Different targets don't conflict.
    let second = session.update_occupant_role(&Nickname::from("alice"), RoomRole::Visitor, None)?;
    assert_eq!(session.active_operations_count(), 2);

    for tx in senders.lock().drain(..) {
        _ = tx.send(Ok(()));
    }

    assert_eq!(first.wait().await, RoomOpState::Succeeded);
    assert_eq!(second.wait().await, RoomOpState::Succeeded);
    assert_eq!(session.active_operations_count(), 0);
    assert_eq!(
        session.room().occupant(&bob).map(|o| o.role),
        Some(RoomRole::Visitor)
    );

    Ok(())
}

#[tokio::test]
async fn test_cancel_active_operations() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let senders = PendingResults::default();

    {
        let hook_calls = hook_calls.clone();
        let senders = senders.clone();
        deps.room_operation_backend
            .expect_start_operation()
            .once()
            .returning(move |_, _| {
                let (tx, handle) = RoomOperationHandle::channel();
                senders.lock().push(tx);
                let hook_calls = hook_calls.clone();
                handle.with_cancel_hook(move || {
                    hook_calls.fetch_add(1, Ordering::SeqCst);
                })
            });
    }

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![occupant("bob", RoomAffiliation::None, RoomRole::Participant)],
    );

    let operation = session.kick_occupant(&Nickname::from("bob"), None)?;
    let cancel_handle = operation.cancel_handle();

    // Let the operation start on the backend.
    while cancel_handle.state() != RoomOpState::Running {
        tokio::task::yield_now().await;
    }

    assert_eq!(session.cancel_active_operations(), 1);
    assert_eq!(session.active_operations_count(), 0);

    // A late result must not be delivered.
    for tx in senders.lock().drain(..) {
        _ = tx.send(Ok(()));
    }

    assert_eq!(operation.wait().await, RoomOpState::Cancelled);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    assert!(session.room().occupant(&Nickname::from("bob")).is_some());
    assert!(recorder.events().is_empty());

    // Nothing left to cancel.
    assert_eq!(session.cancel_active_operations(), 0);

    Ok(())
}

#[tokio::test]
async fn test_cancelling_finished_operation_is_noop() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, _) = joined_session(&deps.into_deps(), None, vec![]);

    let operation = session.join("jane", None)?;
    let cancel_handle = operation.cancel_handle();

    assert_eq!(operation.wait().await, RoomOpState::Succeeded);
    assert!(!cancel_handle.cancel());
    assert_eq!(cancel_handle.state(), RoomOpState::Succeeded);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_operation_times_out() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    deps.ctx.config.room_operation_timeout = Some(Duration::from_secs(10));
    let _senders = expect_pending_operations(&mut deps, 1);

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Member, RoomRole::Participant)),
        vec![],
    );

    let state = session.leave()?.wait().await;

    assert_eq!(state, RoomOpState::Failed);
    assert!(session.room().is_open());
    assert!(recorder.events().is_empty());
    assert_eq!(session.active_operations_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_operations_target_session_room() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .withf(|room_id: &RoomId, _| room_id == &room_id!("room@conference.prose.org"))
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, _) = joined_session(&deps.into_deps(), None, vec![]);
    session.join("jane", None)?.wait().await;

    Ok(())
}

#[tokio::test]
async fn test_ban_removes_occupant() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.room_operation_backend
        .expect_start_operation()
        .once()
        .with(
            predicate::always(),
            predicate::eq(RoomOperationRequest::SetAffiliation {
                nickname: Nickname::from("bob"),
                affiliation: RoomAffiliation::Outcast,
                reason: None,
            }),
        )
        .returning(|_, _| RoomOperationHandle::resolved(Ok(())));

    let (session, recorder) = joined_session(
        &deps.into_deps(),
        Some(occupant("jane", RoomAffiliation::Owner, RoomRole::Moderator)),
        vec![occupant("bob", RoomAffiliation::Member, RoomRole::Participant)],
    );

    let state = session
        .update_occupant_affiliation(&Nickname::from("bob"), RoomAffiliation::Outcast, None)?
        .wait()
        .await;

    assert_eq!(state, RoomOpState::Succeeded);
    assert_eq!(session.room().occupant(&Nickname::from("bob")), None);
    assert_eq!(
        recorder.events(),
        vec![RoomEvent::OccupantLeft {
            occupant: occupant("bob", RoomAffiliation::Outcast, RoomRole::Participant)
        }]
    );

    Ok(())
}

#[test]
fn test_operations_can_be_started_outside_of_the_runtime() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let deps = {
        let _guard = runtime.enter();
        let mut deps = MockAppDependencies::default();
        deps.room_operation_backend
            .expect_start_operation()
            .once()
            .returning(|_, _| RoomOperationHandle::resolved(Ok(())));
        deps.into_deps()
    };

    let (session, _) = joined_session(&deps, None, vec![]);

    assert!(tokio::runtime::Handle::try_current().is_err());
    let operation = session.join("jane", None)?;

    assert_eq!(runtime.block_on(operation.wait()), RoomOpState::Succeeded);
    assert_eq!(session.room().self_nickname(), Some(Nickname::from("jane")));

    Ok(())
}
