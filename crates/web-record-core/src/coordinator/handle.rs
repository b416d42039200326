use crate::{
    Command, CommandResponse, CoreResult, RecorderError, UiMessage,
    coordinator::{BROADCAST_CAPACITY, CoordinatorEvent, MAILBOX_CAPACITY, SurfaceReporter},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::{broadcast, mpsc, oneshot};

/// A command paired with its reply slot.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) command: Command,
    pub(crate) reply: oneshot::Sender<CommandResponse>,
}

/// Cloneable front door to a running [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    command_tx: mpsc::Sender<Envelope>,
    events_tx: mpsc::Sender<CoordinatorEvent>,
    updates_tx: broadcast::Sender<UiMessage>,
}

/// Receiving ends consumed by [`Coordinator::new`](crate::Coordinator::new).
#[derive(Debug)]
pub struct CoordinatorInbox {
    pub(crate) command_rx: mpsc::Receiver<Envelope>,
    pub(crate) events_rx: mpsc::Receiver<CoordinatorEvent>,
    pub(crate) updates_tx: broadcast::Sender<UiMessage>,
}

impl CoordinatorHandle {
    /// Create the mailboxes. The handle can be shared before the
    /// coordinator itself is built.
    pub fn channel() -> (CoordinatorHandle, CoordinatorInbox) {
        let (command_tx, command_rx) = mpsc::channel(MAILBOX_CAPACITY);
        let (events_tx, events_rx) = mpsc::channel(MAILBOX_CAPACITY);
        let (updates_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        let handle = CoordinatorHandle {
            command_tx,
            events_tx,
            updates_tx: updates_tx.clone(),
        };
        let inbox = CoordinatorInbox {
            command_rx,
            events_rx,
            updates_tx,
        };
        (handle, inbox)
    }

    /// Send a command and wait for its reply.
    pub async fn send(&self, command: Command) -> CoreResult<CommandResponse> {
        let (reply, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Envelope { command, reply })
            .await
            .map_err(|e| RecorderError::ChannelClosed {
                message: format!("Failed to send {:?}: coordinator stopped", e.0.command),
                location: ErrorLocation::from(Location::caller()),
            })?;

        reply_rx.await.map_err(|_| RecorderError::ChannelClosed {
            message: "Coordinator dropped the reply".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Deliver an out-of-band event (tab closed, surface report).
    pub async fn notify(&self, event: CoordinatorEvent) -> CoreResult<()> {
        self.events_tx
            .send(event)
            .await
            .map_err(|e| RecorderError::ChannelClosed {
                message: format!("Failed to deliver {:?}: coordinator stopped", e.0),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Reporter handed to the capture surface.
    pub fn reporter(&self) -> SurfaceReporter {
        SurfaceReporter {
            events_tx: self.events_tx.clone(),
        }
    }

    /// Subscribe to `STATE_UPDATE` pushes. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<UiMessage> {
        self.updates_tx.subscribe()
    }
}
