//! Common type definitions for Aegis.
//!
//! - [`Direction`]: encrypt or decrypt, with labels for progress messages
//! - [`TransformOutcome`]: the immutable result of one file's transform attempt
//! - [`FileStatus`]: what a front end shows for a managed file

use std::fmt::{Display, Formatter, Result};

use crate::error::{ErrorKind, TransformError};

/// Which way a batch run transforms its files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    /// Array containing both directions for menus.
    pub const ALL: &'static [Self] = &[Self::Encrypt, Self::Decrypt];

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypt",
            Self::Decrypt => "Decrypt",
        }
    }

    /// Verb used at the start of a progress message.
    #[inline]
    pub fn progress_verb(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypting",
            Self::Decrypt => "Decrypting",
        }
    }

    /// Past participle used in summaries.
    #[inline]
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Encrypt => "encrypted",
            Self::Decrypt => "decrypted",
        }
    }
}

impl Display for Direction {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.label())
    }
}

/// Result of one transform attempt.
///
/// A cooperative cancellation is reported as `success == false` with
/// [`ErrorKind::None`]; every real failure carries a kind other than `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformOutcome {
    success: bool,
    error: ErrorKind,
    detail: String,
}

impl TransformOutcome {
    pub const CANCELLED: &'static str = "cancelled";

    #[inline]
    pub fn succeeded() -> Self {
        Self { success: true, error: ErrorKind::None, detail: String::new() }
    }

    #[inline]
    pub fn cancelled() -> Self {
        Self { success: false, error: ErrorKind::None, detail: Self::CANCELLED.to_owned() }
    }

    pub fn failed(error: ErrorKind, detail: impl Into<String>) -> Self {
        Self { success: false, error, detail: detail.into() }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        !self.success && self.error == ErrorKind::None
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        !self.success && self.error != ErrorKind::None
    }

    #[inline]
    pub fn error(&self) -> ErrorKind {
        self.error
    }

    #[inline]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<&TransformError> for TransformOutcome {
    fn from(err: &TransformError) -> Self {
        Self::failed(err.kind(), err.to_string())
    }
}

/// Display state of a managed file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    /// Not processed by any batch run yet.
    Pending,
    Succeeded,
    /// Stopped by cancellation partway through; the original is untouched.
    Cancelled,
    Failed(ErrorKind),
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Succeeded => f.write_str("done"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}
