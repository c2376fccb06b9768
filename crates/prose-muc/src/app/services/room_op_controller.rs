// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use strum_macros::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::rooms::models::RoomOperationError;
use crate::domain::rooms::services::{CancelHook, RoomOperationHandle};
use crate::domain::shared::models::RoomId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RoomOpState {
    Idle,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RoomOpState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Runs a single cancelable room operation.
///
/// The operation ends in exactly one of `Succeeded`, `Failed` or `Cancelled`. Whoever moves the
/// state out of `Running` first wins. A cancellation that loses the race is a no-op, and a result
/// that arrives after a cancellation is dropped without invoking any callback. A forced failure
/// (see `RoomOpCancelHandle::fail`) wins over any result the backend reports later.
pub struct RoomOpController {
    shared: Arc<Shared>,
    timeout: Option<Duration>,
}

/// Cancels the operation of a `RoomOpController`. Can be cloned and used from any thread.
#[derive(Clone)]
pub struct RoomOpCancelHandle {
    shared: Arc<Shared>,
}

struct Shared {
    who: String,
    room_id: RoomId,
    operation: String,
    token: CancellationToken,
    failure_token: CancellationToken,
    state: Mutex<ControllerState>,
}

struct ControllerState {
    op_state: RoomOpState,
    cancel_hook: Option<CancelHook>,
    forced_failure: Option<RoomOperationError>,
}

impl RoomOpController {
    pub fn new(who: impl Into<String>, room_id: RoomId, operation: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                who: who.into(),
                room_id,
                operation: operation.into(),
                token: CancellationToken::new(),
                failure_token: CancellationToken::new(),
                state: Mutex::new(ControllerState {
                    op_state: RoomOpState::Idle,
                    cancel_hook: None,
                    forced_failure: None,
                }),
            }),
            timeout: None,
        }
    }

    /// Fails the operation with `RoomOperationError::TimedOut` if it doesn't resolve within
    /// `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cancel_handle(&self) -> RoomOpCancelHandle {
        RoomOpCancelHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn state(&self) -> RoomOpState {
        self.shared.state.lock().op_state
    }

    /// Starts the operation via `start` and waits for its outcome.
    ///
    /// `on_success` or `on_error` is invoked at most once, and never if the operation was
    /// cancelled. Returns the terminal state. If the operation was cancelled or failed before
    /// `run` was called, `start` isn't invoked at all.
    pub async fn run<Start, OnSuccess, OnError>(
        self,
        start: Start,
        on_success: OnSuccess,
        on_error: OnError,
    ) -> RoomOpState
    where
        Start: FnOnce() -> RoomOperationHandle,
        OnSuccess: FnOnce(),
        OnError: FnOnce(RoomOperationError),
    {
        let shared = &self.shared;

        let forced_failure = {
            let mut state = shared.state.lock();
            if state.op_state != RoomOpState::Idle {
                debug!(
                    who = %shared.who,
                    room = %shared.room_id,
                    event = %shared.operation,
                    "Not starting operation in state {}.",
                    state.op_state
                );
                return state.op_state;
            }
            match state.forced_failure.take() {
                Some(error) => {
                    state.op_state = RoomOpState::Failed;
                    Some(error)
                }
                None => {
                    state.op_state = RoomOpState::Running;
                    None
                }
            }
        };

        if let Some(error) = forced_failure {
            warn!(who = %shared.who, room = %shared.room_id, event = %shared.operation, "Room operation failed before it was started: {}", error);
            on_error(error);
            return RoomOpState::Failed;
        }

        info!(who = %shared.who, room = %shared.room_id, event = %shared.operation, "Starting room operation…");

        let RoomOperationHandle {
            result,
            cancel_hook,
        } = start();

        if let Some(hook) = cancel_hook {
            let mut state = shared.state.lock();
            if state.op_state == RoomOpState::Running {
                state.cancel_hook = Some(hook);
            } else {
                // Cancelled while the backend was starting. The cancel handle had no hook to
                // call yet.
                drop(state);
                hook();
                return RoomOpState::Cancelled;
            }
        }

        let timeout = async {
            match self.timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = shared.token.cancelled() => None,
            _ = shared.failure_token.cancelled() => Some(Err(RoomOperationError::Aborted)),
            result = result => Some(result.unwrap_or(Err(RoomOperationError::Aborted))),
            _ = timeout => Some(Err(RoomOperationError::TimedOut)),
        };

        let Some(result) = result else {
            return RoomOpState::Cancelled;
        };

        let (result, next_state, hook) = {
            let mut state = shared.state.lock();
            if state.op_state != RoomOpState::Running {
                return state.op_state;
            }

            // A forced failure recorded before we got here wins over the backend's result.
            let forced = state.forced_failure.take();
            let is_forced = forced.is_some();
            let result = match forced {
                Some(error) => Err(error),
                None => result,
            };

            let next_state = match result {
                Ok(_) => RoomOpState::Succeeded,
                Err(_) => RoomOpState::Failed,
            };
            state.op_state = next_state;

            // The backend is still running if we timed out or were failed from the outside.
            let hook = state.cancel_hook.take();
            let hook = match result {
                Err(RoomOperationError::TimedOut) => hook,
                Err(_) if is_forced => hook,
                _ => None,
            };
            (result, next_state, hook)
        };

        match result {
            Ok(_) => {
                info!(who = %shared.who, room = %shared.room_id, event = %shared.operation, "Room operation succeeded.");
                on_success()
            }
            Err(error) => {
                warn!(who = %shared.who, room = %shared.room_id, event = %shared.operation, "Room operation failed: {}", error);
                if let Some(hook) = hook {
                    hook()
                }
                on_error(error)
            }
        }

        next_state
    }
}

impl RoomOpCancelHandle {
    /// Cancels the operation. Returns false if the operation had reached a terminal state already.
    pub fn cancel(&self) -> bool {
        let hook = {
            let mut state = self.shared.state.lock();
            if state.op_state.is_terminal() || state.forced_failure.is_some() {
                return false;
            }
            state.op_state = RoomOpState::Cancelled;
            state.cancel_hook.take()
        };

        self.shared.token.cancel();

        info!(
            who = %self.shared.who,
            room = %self.shared.room_id,
            event = %self.shared.operation,
            "Room operation cancelled."
        );

        if let Some(hook) = hook {
            hook()
        }
        true
    }

    /// Fails the operation with `error` through the error callback, i.e. because the connection
    /// was lost. A backend that is already running is stopped through its cancel hook. Returns
    /// false if the operation had reached a terminal state already or is failing already.
    pub fn fail(&self, error: RoomOperationError) -> bool {
        {
            let mut state = self.shared.state.lock();
            if state.op_state.is_terminal() || state.forced_failure.is_some() {
                return false;
            }
            state.forced_failure = Some(error);
        }

        self.shared.failure_token.cancel();

        info!(
            who = %self.shared.who,
            room = %self.shared.room_id,
            event = %self.shared.operation,
            "Room operation failed from the outside."
        );
        true
    }

    pub fn state(&self) -> RoomOpState {
        self.shared.state.lock().op_state
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == RoomOpState::Cancelled
    }

    pub fn operation(&self) -> &str {
        &self.shared.operation
    }
}

impl Debug for RoomOpCancelHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomOpCancelHandle")
            .field("room_id", &self.shared.room_id)
            .field("operation", &self.shared.operation)
            .field("state", &self.state())
            .finish()
    }
}
