//! Cooperative cancellation.
//!
//! The batch worker polls a [`Cancellation`] at fixed checkpoints and never
//! interrupts a file mid-write, so signalling only ever stops work between
//! safe points.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Anything that can answer "should the current batch stop?".
pub trait Cancellation: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// Cloneable cancellation flag shared between a front end and the worker.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Cancellation for CancelFlag {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A token that is never cancelled.
#[derive(Clone, Copy, Debug, Default)]
pub struct Never;

impl Cancellation for Never {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}
