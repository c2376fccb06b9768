// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use app_context::{AppContext, MucConfig};
pub use app_dependencies::*;
#[cfg(feature = "test")]
pub use coordinator::MockCoordinator;
pub use coordinator::{Coordinator, CoordinatorTask};

mod app_context;
mod app_dependencies;
mod coordinator;
