// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Debug, Formatter};

use tokio::sync::oneshot;

use crate::domain::rooms::models::{RoomAffiliation, RoomOperationError, RoomRole};
use crate::domain::shared::models::{Nickname, RoomId};

pub type RoomOperationResult = Result<(), RoomOperationError>;

/// Called at most once to abort an operation that is still running on the backend.
pub type CancelHook = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, PartialEq)]
pub enum RoomOperationRequest {
    Join {
        nickname: Nickname,
        password: Option<String>,
    },
    Leave {
        nickname: Nickname,
    },
    Destroy {
        alternative_room_id: Option<RoomId>,
        reason: Option<String>,
    },
    SetAffiliation {
        nickname: Nickname,
        affiliation: RoomAffiliation,
        reason: Option<String>,
    },
    SetRole {
        nickname: Nickname,
        role: RoomRole,
        reason: Option<String>,
    },
}

/// A started backend operation.
///
/// The backend reports the outcome through `result` exactly once. Dropping the sender without
/// sending is treated as an aborted operation.
pub struct RoomOperationHandle {
    pub result: oneshot::Receiver<RoomOperationResult>,
    pub cancel_hook: Option<CancelHook>,
}

impl RoomOperationHandle {
    pub fn new(result: oneshot::Receiver<RoomOperationResult>) -> Self {
        Self {
            result,
            cancel_hook: None,
        }
    }

    /// Returns a handle together with the sender the backend reports the outcome through.
    pub fn channel() -> (oneshot::Sender<RoomOperationResult>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::new(rx))
    }

    /// Returns a handle that has already been resolved with `result`.
    pub fn resolved(result: RoomOperationResult) -> Self {
        let (tx, handle) = Self::channel();
        // The receiver is alive, so this can't fail.
        _ = tx.send(result);
        handle
    }

    pub fn with_cancel_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.cancel_hook = Some(Box::new(hook));
        self
    }
}

impl Debug for RoomOperationHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomOperationHandle")
            .field("has_cancel_hook", &self.cancel_hook.is_some())
            .finish_non_exhaustive()
    }
}

/// Starts room operations on behalf of the room session.
#[cfg_attr(feature = "test", mockall::automock)]
pub trait RoomOperationBackend: Send + Sync {
    fn start_operation(
        &self,
        room_id: &RoomId,
        request: RoomOperationRequest,
    ) -> RoomOperationHandle;
}
