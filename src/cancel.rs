//! Cooperative cancellation for engine operations.
//!
//! Every engine operation accepts a [`CancelToken`]. Each operation is a
//! single read-modify-write: the token is checked on entry and again
//! immediately before the staged mutation commits, so a cancelled
//! operation never leaves a partially-applied record visible.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag signalling that the caller no longer wants the result.
///
/// Tokens are cheap to clone; all clones observe the same flag. The
/// engine only reads the flag, it never retries internally — retries
/// belong to the transport layer.
///
/// # Example
///
/// ```
/// use attendance_engine::cancel::CancelToken;
///
/// let token = CancelToken::new();
/// assert!(!token.is_cancelled());
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
