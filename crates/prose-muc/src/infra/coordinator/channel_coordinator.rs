// prose-core-client/prose-muc
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::app::deps::{Coordinator, CoordinatorTask};

/// A `Coordinator` that queues tasks for a `CoordinatorLoop`.
#[derive(Clone)]
pub struct ChannelCoordinator {
    tx: mpsc::UnboundedSender<CoordinatorTask>,
}

/// Runs the tasks submitted to its `ChannelCoordinator` one after another, in submission order.
pub struct CoordinatorLoop {
    rx: mpsc::UnboundedReceiver<CoordinatorTask>,
}

impl ChannelCoordinator {
    pub fn new() -> (Self, CoordinatorLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, CoordinatorLoop { rx })
    }
}

impl Coordinator for ChannelCoordinator {
    fn run(&self, task: CoordinatorTask) {
        if self.tx.send(task).is_err() {
            warn!("Coordinator loop has stopped. Dropping task.");
        }
    }
}

impl CoordinatorLoop {
    /// Runs tasks until `cancel_token` is cancelled or every `ChannelCoordinator` has been
    /// dropped. Tasks that are still queued when the token is cancelled are dropped.
    #[instrument(skip_all, name = "muc.coordinator")]
    pub async fn run(mut self, cancel_token: CancellationToken) {
        info!("Starting coordinator loop");

        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    info!("Coordinator loop received shutdown signal, exiting");
                    break;
                }
                task = self.rx.recv() => {
                    let Some(task) = task else {
                        info!("All coordinators were dropped, exiting");
                        break;
                    };
                    task()
                }
            }
        }
    }

    /// Spawns `run` on the current tokio runtime.
    pub fn spawn(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel_token))
    }
}
