//! Error taxonomy for the transform pipeline.
//!
//! Per-file failures never escape a batch run as panics or `Err`s: the
//! transformer converts every [`TransformError`] into a
//! [`TransformOutcome`](crate::types::TransformOutcome) carrying its
//! [`ErrorKind`] and message.

use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use strum::Display;
use thiserror::Error;

/// Flat classification of a per-file failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// Success, or a cooperative cancellation.
    #[default]
    #[strum(to_string = "No error")]
    None,

    #[strum(to_string = "Invalid key")]
    InvalidKey,

    #[strum(to_string = "File too large")]
    FileTooLarge,

    #[strum(to_string = "File access error")]
    FileAccessError,

    /// Wrong password and corrupted ciphertext both land here; they cannot be
    /// told apart.
    #[strum(to_string = "Decryption error")]
    DecryptionError,

    #[strum(to_string = "Encryption error")]
    EncryptionError,

    #[strum(to_string = "Unknown error")]
    UnknownError,
}

/// Failure inside the block cipher layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("key rejected by cipher: expected 16 bytes, got {0}")]
    InvalidKey(usize),

    /// Bad padding or a ciphertext length that is not a whole number of
    /// blocks. Produced by a wrong password and by corruption alike.
    #[error("invalid padding or wrong key")]
    InvalidPaddingOrKey,

    #[error("padding failed")]
    Padding,
}

/// Failure of one file's transform.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("file is {size} but the in-memory limit is {limit}")]
    TooLarge { size: ByteSize, limit: ByteSize },

    #[error("failed to {action} {}: {source}", path.display())]
    Access {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file already sits at the temporary path. It is never overwritten or
    /// removed, since it may be a user's file or a kept replacement.
    #[error("temporary path {} already exists", .0.display())]
    TempExists(PathBuf),

    #[error("decryption failed (wrong password or corrupted data): {0}")]
    Decrypt(#[source] CipherError),

    #[error("encryption failed: {0}")]
    Encrypt(#[source] CipherError),

    #[error("{0}")]
    Key(#[source] CipherError),

    #[error("{0}")]
    Unknown(String),
}

impl TransformError {
    pub fn access(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Access { action, path: path.to_path_buf(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TooLarge { .. } => ErrorKind::FileTooLarge,
            Self::Access { .. } | Self::TempExists(_) => ErrorKind::FileAccessError,
            Self::Decrypt(_) => ErrorKind::DecryptionError,
            Self::Encrypt(_) => ErrorKind::EncryptionError,
            Self::Key(_) => ErrorKind::InvalidKey,
            Self::Unknown(_) => ErrorKind::UnknownError,
        }
    }
}

/// Failure while promoting a replacement over its original.
///
/// The replacement is always left in place under its temporary name when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum EraseError {
    #[error("failed to remove original {}: {source}; new content kept at {}", original.display(), temp.display())]
    Delete {
        original: PathBuf,
        temp: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rename {} to {}: {source}; new content kept at {}", temp.display(), original.display(), temp.display())]
    Rename {
        original: PathBuf,
        temp: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A failed transform left a partial output that could not be removed.
    /// The original is untouched.
    #[error("failed to remove temporary file {}: {source}", temp.display())]
    Cleanup {
        temp: PathBuf,
        #[source]
        source: io::Error,
    },
}
