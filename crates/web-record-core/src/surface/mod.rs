mod capture;
mod chunks;
mod link;
mod media;
mod sink;

pub(crate) use capture::SurfaceRequest;

pub use {
    capture::CaptureSurface,
    chunks::ChunkBuffer,
    link::LocalSurfaceLink,
    media::{CaptureStream, MediaSource, OpenOptions, StreamControl},
    sink::{FsRecordingSink, RecordingSink},
};
