use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, SteenroderError};

/// A handle that long running computations poll to find out whether they should stop.
///
/// Cloning a token gives another handle to the same flag, so a token can be handed to a
/// computation while another thread keeps a clone to cancel it. A token may also carry a deadline,
/// after which it counts as cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// A token that is only cancelled by [`CancellationToken::cancel`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Return [`SteenroderError::Cancelled`] if the token is cancelled. `progress` is the number of
    /// units of work (columns or simplices) completed so far and is reported in the error.
    pub fn check(&self, progress: usize) -> Result<()> {
        if self.is_cancelled() {
            tracing::warn!(progress, "computation cancelled");
            Err(SteenroderError::Cancelled { columns: progress })
        } else {
            Ok(())
        }
    }
}
