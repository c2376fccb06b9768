// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use strum_macros::Display;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::app::deps::{AppDependencies, DynAppContext, DynCoordinator, DynRoomOperationBackend};
use crate::app::event_handlers::{RoomEvent, RoomServerEventType};
use crate::domain::rooms::models::{
    MucError, Occupant, Room, RoomAffiliation, RoomClosedReason, RoomError,
    RoomOperationError, RoomRole,
};
use crate::domain::rooms::services::RoomOperationRequest;
use crate::domain::shared::models::{Nickname, RoomId};

use super::{RoomOpCancelHandle, RoomOpController, RoomOpState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RoomOperationKind {
    Join,
    Leave,
    Destroy,
    UpdateAffiliation,
    UpdateRole,
    Kick,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OperationKey {
    kind: RoomOperationKind,
    nickname: Option<Nickname>,
}

/// An operation started by a `RoomSession`.
pub struct RoomOperation {
    kind: RoomOperationKind,
    cancel_handle: RoomOpCancelHandle,
    outcome: oneshot::Receiver<RoomOpState>,
}

impl RoomOperation {
    pub fn kind(&self) -> RoomOperationKind {
        self.kind
    }

    pub fn cancel_handle(&self) -> RoomOpCancelHandle {
        self.cancel_handle.clone()
    }

    pub fn cancel(&self) -> bool {
        self.cancel_handle.cancel()
    }

    /// Waits until the operation has reached a terminal state and its callbacks have run on the
    /// coordinator. An operation of the same kind for the same occupant can be started again once
    /// this resolves.
    pub async fn wait(self) -> RoomOpState {
        self.outcome.await.unwrap_or(RoomOpState::Cancelled)
    }
}

impl Debug for RoomOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomOperation")
            .field("kind", &self.kind)
            .field("state", &self.cancel_handle.state())
            .finish()
    }
}

/// Our user's session in a single room.
///
/// The session starts room operations on the backend, guards them with the self occupant's
/// privileges and applies their outcome (as well as incoming server events) to the room on the
/// coordinator.
#[derive(Clone)]
pub struct RoomSession {
    inner: Arc<RoomSessionInner>,
}

struct RoomSessionInner {
    ctx: DynAppContext,
    runtime: Handle,
    room: Room,
    backend: DynRoomOperationBackend,
    coordinator: DynCoordinator,
    active_operations: Mutex<HashMap<OperationKey, (u64, RoomOpCancelHandle)>>,
    next_operation_id: AtomicU64,
}

impl RoomSession {
    pub fn new(deps: &AppDependencies, room: Room) -> Self {
        Self {
            inner: Arc::new(RoomSessionInner {
                ctx: deps.ctx.clone(),
                runtime: deps.runtime.clone(),
                room,
                backend: deps.room_operation_backend.clone(),
                coordinator: deps.coordinator.clone(),
                active_operations: Default::default(),
                next_operation_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn room(&self) -> &Room {
        &self.inner.room
    }

    pub fn room_id(&self) -> &RoomId {
        self.inner.room.room_id()
    }

    /// The number of operations that haven't reached a terminal state yet.
    pub fn active_operations_count(&self) -> usize {
        self.inner.active_operations.lock().len()
    }
}

impl RoomSession {
    #[instrument(skip_all, fields(who = %self.inner.ctx.who(), room = %self.room_id()))]
    pub fn join(
        &self,
        nickname: impl Into<Nickname>,
        password: Option<String>,
    ) -> Result<RoomOperation, RoomError> {
        let nickname = nickname.into();
        let room = self.inner.room.clone();

        let on_success = {
            let nickname = nickname.clone();
            move || room.set_self_nickname(nickname)
        };

        let on_error = {
            let session = self.clone();
            let nickname = nickname.clone();
            move |error: RoomOperationError| session.publish_operation_error(&error, Some(nickname))
        };

        self.start_operation(
            RoomOperationKind::Join,
            Some(nickname.clone()),
            RoomOperationRequest::Join { nickname, password },
            on_success,
            on_error,
        )
    }

    #[instrument(skip_all, fields(who = %self.inner.ctx.who(), room = %self.room_id()))]
    pub fn leave(&self) -> Result<RoomOperation, RoomError> {
        self.ensure_open()?;

        let nickname = self
            .inner
            .room
            .self_nickname()
            .ok_or(RoomError::NotJoined(self.room_id().clone()))?;

        let room = self.inner.room.clone();
        let on_error = {
            let session = self.clone();
            move |error: RoomOperationError| session.publish_operation_error(&error, None)
        };

        self.start_operation(
            RoomOperationKind::Leave,
            Some(nickname.clone()),
            RoomOperationRequest::Leave { nickname },
            move || room.close(RoomClosedReason::Left),
            on_error,
        )
    }

    #[instrument(skip_all, fields(who = %self.inner.ctx.who(), room = %self.room_id()))]
    pub fn destroy(
        &self,
        alternative_room_id: Option<RoomId>,
        reason: Option<String>,
    ) -> Result<RoomOperation, RoomError> {
        let actor = self.self_occupant()?;

        if !actor.can_destroy_room() {
            return Err(self.not_allowed("destroy the room"));
        }

        let room = self.inner.room.clone();
        let on_success = {
            let alternative_room_id = alternative_room_id.clone();
            let reason = reason.clone();
            move || {
                room.close(RoomClosedReason::Destroyed {
                    alternative_room_id,
                    reason,
                })
            }
        };
        let on_error = {
            let session = self.clone();
            move |error: RoomOperationError| session.publish_operation_error(&error, None)
        };

        self.start_operation(
            RoomOperationKind::Destroy,
            None,
            RoomOperationRequest::Destroy {
                alternative_room_id,
                reason,
            },
            on_success,
            on_error,
        )
    }

    #[instrument(skip_all, fields(who = %self.inner.ctx.who(), room = %self.room_id()))]
    pub fn update_occupant_affiliation(
        &self,
        nickname: &Nickname,
        affiliation: RoomAffiliation,
        reason: Option<String>,
    ) -> Result<RoomOperation, RoomError> {
        let actor = self.self_occupant()?;
        let target = self.occupant(nickname)?;

        if !actor.can_change_affiliation(&target) {
            return Err(self.not_allowed(format!("change the affiliation of '{}'", nickname)));
        }

        let room = self.inner.room.clone();
        let on_success = {
            let nickname = nickname.clone();
            let reason = reason.clone();
            move || {
                if let Err(error) =
                    room.update_affiliation(&nickname, affiliation, reason, Some(actor.into()))
                {
                    warn!("Could not apply affiliation change. {}", error);
                }
            }
        };
        let on_error = {
            let session = self.clone();
            move |error: RoomOperationError| session.publish_operation_error(&error, None)
        };

        self.start_operation(
            RoomOperationKind::UpdateAffiliation,
            Some(nickname.clone()),
            RoomOperationRequest::SetAffiliation {
                nickname: nickname.clone(),
                affiliation,
                reason,
            },
            on_success,
            on_error,
        )
    }

    #[instrument(skip_all, fields(who = %self.inner.ctx.who(), room = %self.room_id()))]
    pub fn update_occupant_role(
        &self,
        nickname: &Nickname,
        role: RoomRole,
        reason: Option<String>,
    ) -> Result<RoomOperation, RoomError> {
        let actor = self.self_occupant()?;
        let target = self.occupant(nickname)?;

        if !actor.can_change_role(&target) {
            return Err(self.not_allowed(format!("change the role of '{}'", nickname)));
        }

        let room = self.inner.room.clone();
        let on_success = {
            let nickname = nickname.clone();
            let reason = reason.clone();
            move || {
                if let Err(error) = room.update_role(&nickname, role, reason, Some(actor.into())) {
                    warn!("Could not apply role change. {}", error);
                }
            }
        };
        let on_error = {
            let session = self.clone();
            move |error: RoomOperationError| session.publish_operation_error(&error, None)
        };

        self.start_operation(
            RoomOperationKind::UpdateRole,
            Some(nickname.clone()),
            RoomOperationRequest::SetRole {
                nickname: nickname.clone(),
                role,
                reason,
            },
            on_success,
            on_error,
        )
    }

    /// Kicks the occupant by revoking their role. The occupant is removed from the roster once
    /// the server confirms the kick.
    #[instrument(skip_all, fields(who = %self.inner.ctx.who(), room = %self.room_id()))]
    pub fn kick_occupant(
        &self,
        nickname: &Nickname,
        reason: Option<String>,
    ) -> Result<RoomOperation, RoomError> {
        let actor = self.self_occupant()?;
        let target = self.occupant(nickname)?;

        if !actor.can_kick_occupant(&target) {
            return Err(self.not_allowed(format!("kick '{}'", nickname)));
        }

        let room = self.inner.room.clone();
        let on_success = {
            let nickname = nickname.clone();
            move || {
                room.remove_occupant(&nickname);
            }
        };
        let on_error = {
            let session = self.clone();
            move |error: RoomOperationError| session.publish_operation_error(&error, None)
        };

        self.start_operation(
            RoomOperationKind::Kick,
            Some(nickname.clone()),
            RoomOperationRequest::SetRole {
                nickname: nickname.clone(),
                role: RoomRole::None,
                reason,
            },
            on_success,
            on_error,
        )
    }

    /// Cancels every operation that hasn't reached a terminal state. Returns the number of
    /// cancelled operations.
    pub fn cancel_active_operations(&self) -> usize {
        let operations = self
            .inner
            .active_operations
            .lock()
            .drain()
            .collect::<Vec<_>>();

        operations
            .into_iter()
            .filter(|(_, (_, handle))| handle.cancel())
            .count()
    }

    /// Fails every operation that hasn't reached a terminal state with `error`, delivering it
    /// through the operations' error callbacks. Returns the number of failed operations.
    pub fn fail_active_operations(&self, error: RoomOperationError) -> usize {
        let operations = self
            .inner
            .active_operations
            .lock()
            .drain()
            .collect::<Vec<_>>();

        operations
            .into_iter()
            .filter(|(_, (_, handle))| handle.fail(error.clone()))
            .count()
    }
}

impl RoomSession {
    /// Applies `event` to the room on the coordinator.
    pub fn handle_server_event(&self, event: RoomServerEventType) {
        let session = self.clone();
        self.inner
            .coordinator
            .run(Box::new(move || session.apply_server_event(event)));
    }

    fn apply_server_event(&self, event: RoomServerEventType) {
        let room = &self.inner.room;

        match event {
            RoomServerEventType::SelfPresence { occupant } => room.add_self_occupant(occupant),
            RoomServerEventType::OccupantPresence { occupant } => {
                room.insert_occupant(occupant);
            }
            RoomServerEventType::OccupantLeft { nickname } => {
                room.remove_occupant(&nickname);
            }
            RoomServerEventType::AffiliationChanged {
                nickname,
                affiliation,
                reason,
                actor,
            } => {
                if let Err(error) = room.update_affiliation(&nickname, affiliation, reason, actor) {
                    debug!(room = %self.room_id(), "Ignoring affiliation change. {}", error);
                }
            }
            RoomServerEventType::RoleChanged {
                nickname,
                role,
                reason,
                actor,
            } => {
                if let Err(error) = room.update_role(&nickname, role, reason, actor) {
                    debug!(room = %self.room_id(), "Ignoring role change. {}", error);
                }
            }
            RoomServerEventType::SelfRemoved { reason } => room.close(reason),
            RoomServerEventType::MessageReceived { nickname, body } => room
                .event_bus()
                .publish(&RoomEvent::MessageReceived { nickname, body }),
            RoomServerEventType::SubjectChanged { subject } => room.set_subject(subject),
            RoomServerEventType::RoomInfoReceived { config } => room.set_config(config),
            RoomServerEventType::LoggingEnabled => room.set_logging_enabled(true),
            RoomServerEventType::LoggingDisabled => room.set_logging_enabled(false),
            RoomServerEventType::Destroyed {
                alternative_room_id,
                reason,
            } => room.close(RoomClosedReason::Destroyed {
                alternative_room_id,
                reason,
            }),
            RoomServerEventType::Error { error } => {
                self.publish_muc_error(error, room.self_nickname())
            }
        }
    }
}

impl RoomSession {
    fn start_operation(
        &self,
        kind: RoomOperationKind,
        nickname: Option<Nickname>,
        request: RoomOperationRequest,
        on_success: impl FnOnce() + Send + 'static,
        on_error: impl FnOnce(RoomOperationError) + Send + 'static,
    ) -> Result<RoomOperation, RoomError> {
        let key = OperationKey { kind, nickname };
        let controller = RoomOpController::new(
            self.inner.ctx.who(),
            self.room_id().clone(),
            kind.to_string(),
        )
        .with_timeout(self.inner.ctx.config.room_operation_timeout);
        let cancel_handle = controller.cancel_handle();
        let operation_id = self.inner.next_operation_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut active_operations = self.inner.active_operations.lock();
            if active_operations.contains_key(&key) {
                return Err(RoomError::OperationInProgress {
                    room_id: self.room_id().clone(),
                    operation: kind.to_string(),
                });
            }
            active_operations.insert(key.clone(), (operation_id, cancel_handle.clone()));
        }

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let session = self.clone();

        self.inner.runtime.spawn(async move {
            let backend = session.inner.backend.clone();
            let room_id = session.room_id().clone();
            let coordinator = session.inner.coordinator.clone();
            let error_coordinator = coordinator.clone();

            let state = controller
                .run(
                    move || backend.start_operation(&room_id, request),
                    move || coordinator.run(Box::new(on_success)),
                    move |error| error_coordinator.run(Box::new(move || on_error(error))),
                )
                .await;

            // Callbacks were queued on the coordinator before. Release the key after they ran.
            let coordinator = session.inner.coordinator.clone();
            coordinator.run(Box::new(move || {
                session.forget_operation(&key, operation_id);
                _ = outcome_tx.send(state);
            }));
        });

        Ok(RoomOperation {
            kind,
            cancel_handle,
            outcome: outcome_rx,
        })
    }

    fn forget_operation(&self, key: &OperationKey, operation_id: u64) {
        let mut active_operations = self.inner.active_operations.lock();
        if active_operations.get(key).map(|(id, _)| *id) == Some(operation_id) {
            active_operations.remove(key);
        }
    }

    fn publish_operation_error(&self, error: &RoomOperationError, nickname: Option<Nickname>) {
        let RoomOperationError::Muc(error) = error else {
            return;
        };
        self.publish_muc_error(error.clone(), nickname.or(self.inner.room.self_nickname()))
    }

    fn publish_muc_error(&self, error: MucError, nickname: Option<Nickname>) {
        let bus = self.inner.room.event_bus();

        let follow_up = match error {
            MucError::Conflict { .. } => Some(RoomEvent::NicknameConflict { nickname }),
            MucError::RegistrationRequired { .. } => {
                Some(RoomEvent::RegistrationRequired { nickname })
            }
            _ => None,
        };

        bus.publish(&RoomEvent::ErrorReceived { error });
        if let Some(event) = follow_up {
            bus.publish(&event);
        }
    }

    fn ensure_open(&self) -> Result<(), RoomError> {
        if !self.inner.room.is_open() {
            return Err(RoomError::RoomIsClosed(self.room_id().clone()));
        }
        Ok(())
    }

    fn self_occupant(&self) -> Result<Occupant, RoomError> {
        self.ensure_open()?;
        self.inner
            .room
            .self_occupant()
            .ok_or(RoomError::NotJoined(self.room_id().clone()))
    }

    fn occupant(&self, nickname: &Nickname) -> Result<Occupant, RoomError> {
        self.inner
            .room
            .occupant(nickname)
            .ok_or(RoomError::OccupantNotFound {
                room_id: self.room_id().clone(),
                nickname: nickname.clone(),
            })
    }

    fn not_allowed(&self, action: impl Into<String>) -> RoomError {
        RoomError::NotAllowed {
            room_id: self.room_id().clone(),
            action: action.into(),
        }
    }
}

impl Debug for RoomSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("room", &self.inner.room)
            .finish_non_exhaustive()
    }
}
