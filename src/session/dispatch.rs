//! Event Dispatch
//!
//! Single FIFO queue between producers (tilt sampler, host UI, the session
//! itself) and the one consumer that owns the engine. Posting never blocks
//! and is safe from any thread.

use tokio::sync::{mpsc, oneshot};

use crate::core::grid::Direction;
use crate::game::snapshot::{SnapshotError, StateSnapshot};

/// Dispatch errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The consumer has shut down.
    #[error("Session queue is closed")]
    Closed,

    /// The consumer dropped a request without replying.
    #[error("Session dropped the request without replying")]
    NoReply,

    /// Restore was rejected by the session.
    #[error("Restore failed: {0}")]
    Restore(#[from] SnapshotError),
}

/// Queued message.
#[derive(Debug)]
pub enum Message {
    /// Commanded roll direction. `Direction::None` means the device is
    /// level and cancels a held command.
    Roll(Direction),
    /// Advance an animated roll by one cell.
    Tick,
    /// Flip the sensor gate.
    ToggleSensor,
    /// Redraw the maze view.
    Invalidate,
    /// Ball consumed a goal.
    ReachedGoal,
    /// Ball hit a wall.
    ReachedWall,
    /// Last goal consumed.
    Solved {
        /// Catalogue index.
        map_id: usize,
        /// Step count at the moment of solving.
        steps: u32,
    },
    /// Reload the current map.
    Restart,
    /// Load the previous map.
    MapPrevious,
    /// Load the next map.
    MapNext,
    /// Load a map by id.
    LoadMap(usize),
    /// Capture the session state.
    Snapshot(oneshot::Sender<StateSnapshot>),
    /// Restore a captured state.
    Restore {
        /// State to restore; `None` keeps the current state.
        snapshot: Option<StateSnapshot>,
        /// Outcome of the restore.
        reply: oneshot::Sender<Result<(), SnapshotError>>,
    },
    /// Process what is already queued, then stop.
    Shutdown,
}

/// Create a connected sender/receiver pair.
pub fn channel() -> (MessageSender, MessageReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MessageSender { tx }, MessageReceiver { rx })
}

/// Cloneable producer handle.
#[derive(Clone, Debug)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl MessageSender {
    /// Enqueue a message.
    pub fn post(&self, message: Message) -> Result<(), DispatchError> {
        self.tx.send(message).map_err(|_| DispatchError::Closed)
    }

    /// Enqueue a roll command.
    pub fn roll(&self, direction: Direction) -> Result<(), DispatchError> {
        self.post(Message::Roll(direction))
    }

    /// Ask the session for a snapshot and wait for it.
    pub async fn snapshot(&self) -> Result<StateSnapshot, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.post(Message::Snapshot(reply))?;
        rx.await.map_err(|_| DispatchError::NoReply)
    }

    /// Ask the session to restore `snapshot` and wait for the outcome.
    pub async fn restore(&self, snapshot: Option<StateSnapshot>) -> Result<(), DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.post(Message::Restore { snapshot, reply })?;
        rx.await.map_err(|_| DispatchError::NoReply)??;
        Ok(())
    }

    /// Ask the session to stop.
    pub fn shutdown(&self) -> Result<(), DispatchError> {
        self.post(Message::Shutdown)
    }

    /// Check if the consumer is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Handle that does not keep the queue open.
    pub(crate) fn downgrade(&self) -> WeakMessageSender {
        WeakMessageSender { tx: self.tx.downgrade() }
    }
}

/// Sender that does not count towards keeping the queue open.
#[derive(Clone, Debug)]
pub(crate) struct WeakMessageSender {
    tx: mpsc::WeakUnboundedSender<Message>,
}

impl WeakMessageSender {
    /// Strong handle, if any producer is still alive.
    pub(crate) fn upgrade(&self) -> Option<MessageSender> {
        self.tx.upgrade().map(|tx| MessageSender { tx })
    }
}

/// Consumer end of the queue.
#[derive(Debug)]
pub struct MessageReceiver {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl MessageReceiver {
    /// Wait for the next message. `None` once every sender is gone and the
    /// queue is empty.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Next message if one is ready.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}

// =============================================================================
// TESTS
// =============================================================================
