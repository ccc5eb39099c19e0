use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use super::error::CoordinatorError;
use super::messages::{Command, Reply};
use super::state::PlayerState;

pub(super) type ReplyTx = oneshot::Sender<Result<Reply, CoordinatorError>>;

/// Messages into the coordinator task.
pub(super) enum Request {
    Command {
        command: Command,
        /// `None` for fire-and-forget commands.
        reply: Option<ReplyTx>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Cloneable entry point to a running coordinator.
///
/// The `blocking_*` methods are for renderers running on a blocking thread and
/// must not be called from async code.
#[derive(Clone)]
pub struct CoordinatorHandle {
    requests: mpsc::Sender<Request>,
    updates: broadcast::Sender<PlayerState>,
}

impl CoordinatorHandle {
    pub(super) fn new(
        requests: mpsc::Sender<Request>,
        updates: broadcast::Sender<PlayerState>,
    ) -> Self {
        Self { requests, updates }
    }

    /// Receive a full snapshot after every mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerState> {
        self.updates.subscribe()
    }

    /// Send a command and wait for it to be applied.
    pub async fn execute(&self, command: Command) -> Result<Reply, CoordinatorError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(Request::Command {
                command,
                reply: Some(tx),
            })
            .await
            .map_err(|_| CoordinatorError::Closed)?;
        rx.await.map_err(|_| CoordinatorError::Closed)?
    }

    pub async fn get_state(&self) -> Result<PlayerState, CoordinatorError> {
        into_state(self.execute(Command::GetState).await?)
    }

    /// Send a command without waiting for it.
    pub async fn send(&self, command: Command) {
        let request = Request::Command {
            command,
            reply: None,
        };
        if self.requests.send(request).await.is_err() {
            debug!("coordinator is gone; command dropped");
        }
    }

    pub fn blocking_get_state(&self) -> Result<PlayerState, CoordinatorError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .blocking_send(Request::Command {
                command: Command::GetState,
                reply: Some(tx),
            })
            .map_err(|_| CoordinatorError::Closed)?;
        let reply = rx.blocking_recv().map_err(|_| CoordinatorError::Closed)??;
        into_state(reply)
    }

    pub fn blocking_send(&self, command: Command) {
        let request = Request::Command {
            command,
            reply: None,
        };
        if self.requests.blocking_send(request).is_err() {
            debug!("coordinator is gone; command dropped");
        }
    }

    /// Flush pending state, stop the playback host and end the coordinator task.
    pub async fn shutdown(&self) {
        let (done, finished) = oneshot::channel();
        if self.requests.send(Request::Shutdown { done }).await.is_err() {
            return;
        }
        let _ = finished.await;
    }
}

fn into_state(reply: Reply) -> Result<PlayerState, CoordinatorError> {
    match reply {
        Reply::State(state) => Ok(*state),
        Reply::Ack => Err(CoordinatorError::UnexpectedReply),
    }
}
