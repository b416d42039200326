use std::{fmt::Debug, time::Instant};

/// Source of "now" for session time accounting.
///
/// All timestamps stored in [`SessionState`](crate::SessionState) come from
/// one clock so elapsed-time arithmetic never mixes time bases.
pub trait Clock: Debug + Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;
}

/// Clock backed by the tokio timer.
///
/// Follows `tokio::time::pause`/`advance` under the `test-util` feature, so
/// session time and the coordinator's tick share one time base in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
