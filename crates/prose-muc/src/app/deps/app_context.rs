// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use parking_lot::RwLock;

use crate::domain::shared::models::UserId;

pub struct MucConfig {
    /// How long a room operation may run before it fails with `RoomOperationError::TimedOut`.
    /// `None` waits forever.
    pub room_operation_timeout: Option<Duration>,
}

pub struct AppContext {
    pub connected_id: RwLock<Option<UserId>>,
    pub config: MucConfig,
}

impl AppContext {
    pub fn new(config: MucConfig) -> Self {
        Self {
            connected_id: Default::default(),
            config,
        }
    }
}

impl Default for MucConfig {
    fn default() -> Self {
        Self {
            room_operation_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl AppContext {
    /// The user to attribute log output to.
    pub fn who(&self) -> String {
        self.connected_id
            .read()
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<disconnected>".to_string())
    }

    pub fn set_connected_id(&self, id: UserId) {
        self.connected_id.write().replace(id);
    }

    pub fn reset_connected_id(&self) {
        self.connected_id.write().take();
    }
}
