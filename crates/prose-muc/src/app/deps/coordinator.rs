// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub type CoordinatorTask = Box<dyn FnOnce() + Send>;

/// The single context that mutates rooms and runs observer-visible callbacks.
///
/// `run` never blocks. Tasks submitted from the same caller run in submission order.
#[cfg_attr(feature = "test", mockall::automock)]
pub trait Coordinator: Send + Sync {
    fn run(&self, task: CoordinatorTask);
}
