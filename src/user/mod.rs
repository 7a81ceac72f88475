//! Virtual users and the task they repeat.
mod host;
mod task;


use std::sync::Arc;

use rand::Rng;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::http::execute_request;
use crate::metrics::{Failure, FailureKind, Metrics};
use crate::shutdown::ShutdownReceiver;

pub use host::Host;
pub use task::{SummaryWindow, Task};

/// Everything a virtual user shares with its siblings. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub host: Arc<Host>,
    pub tasks: Arc<[Task]>,
    pub client: Client,
    pub metrics_tx: mpsc::Sender<Metrics>,
}

/// A simulated client. Runs one task at a time: request, record, pause.
#[derive(Debug)]
pub struct VirtualUser {
    id: usize,
    context: UserContext,
}

impl VirtualUser {
    #[must_use]
    pub const fn new(id: usize, context: UserContext) -> Self {
        Self { id, context }
    }

    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Runs one task invocation: exactly one request, one recorded sample,
    /// then the task's pause.
    ///
    /// Returns `true` when the user must stop: shutdown was received or the
    /// collector is gone.
    pub async fn run_once(&self, shutdown_rx: &mut ShutdownReceiver) -> bool {
        let Some(task) = self.pick_task() else {
            warn!(user = self.id, "No tasks configured, stopping user.");
            return true;
        };

        let sample = tokio::select! {
            _ = shutdown_rx.recv() => return true,
            sample = self.invoke(task) => sample,
        };
        if let Some(failure) = sample.failure.as_ref() {
            debug!(
                user = self.id,
                name = sample.name,
                status = sample.status_code,
                "request failed: {}",
                failure.message
            );
        }
        let delivered = tokio::select! {
            _ = shutdown_rx.recv() => return true,
            sent = self.context.metrics_tx.send(sample) => sent.is_ok(),
        };
        if !delivered {
            return true;
        }

        tokio::select! {
            _ = shutdown_rx.recv() => true,
            () = sleep(task.wait()) => false,
        }
    }

    fn pick_task(&self) -> Option<&Task> {
        let tasks = self.context.tasks.as_ref();
        match tasks {
            [] => None,
            [only] => Some(only),
            _ => {
                let index = rand::thread_rng().gen_range(0..tasks.len());
                tasks.get(index)
            }
        }
    }

    async fn invoke(&self, task: &Task) -> Metrics {
        let start = Instant::now();
        let request = match task.build_request(&self.context.client, &self.context.host) {
            Ok(request) => request,
            Err(err) => {
                return Metrics::new(
                    task.name(),
                    task.method(),
                    start,
                    0,
                    0,
                    Some(Failure::new(FailureKind::Transport, err.to_string())),
                );
            }
        };
        let outcome = execute_request(&self.context.client, request).await;
        Metrics::new(
            task.name(),
            task.method(),
            start,
            outcome.status,
            outcome.response_bytes,
            outcome.failure,
        )
    }
}
