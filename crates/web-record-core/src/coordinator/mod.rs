#[allow(clippy::module_inception)]
mod coordinator;
mod event;
mod handle;
mod platform;

pub(crate) use handle::Envelope;

pub use {
    coordinator::{Coordinator, CoordinatorSettings},
    event::{CoordinatorEvent, SurfaceReporter},
    handle::{CoordinatorHandle, CoordinatorInbox},
    platform::{SurfaceLink, TabPlatform},
};

/// Capacity of the command and event mailboxes.
pub(crate) const MAILBOX_CAPACITY: usize = 32;

/// Capacity of the state broadcast; slow listeners skip stale snapshots.
pub(crate) const BROADCAST_CAPACITY: usize = 32;
