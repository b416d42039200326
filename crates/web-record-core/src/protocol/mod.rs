//! Messages exchanged between the coordinator, the capture surface and the
//! control surfaces. Every message is tagged by its `type` field.

mod command;
mod filename;
mod snapshot;
mod surface;

pub use {
    command::{Command, CommandResponse, Outcome},
    filename::{RECORDING_EXTENSION, RECORDING_PREFIX, recording_filename},
    snapshot::{StateSnapshot, UiMessage},
    surface::{CaptureId, StreamId, SurfaceCommand, SurfaceEvent},
};
