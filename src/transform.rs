//! Single-file transform into a sibling temporary file.
//!
//! The input is never opened for writing here. Whatever happens, the original
//! stays byte-for-byte intact; promoting the output is the eraser's job.

use std::io;
use std::path::Path;

use bytesize::ByteSize;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::task;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::cancel::Cancellation;
use crate::cipher::{Cipher, derive_key};
use crate::config::{DEFAULT_MEMORY_BUDGET, RESERVED_HEADROOM};
use crate::error::TransformError;
use crate::secret::Password;
use crate::types::{Direction, TransformOutcome};

/// How much memory a single whole-file transform may assume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryBudget {
    total: u64,
    headroom: u64,
}

impl MemoryBudget {
    pub const fn new(total: u64, headroom: u64) -> Self {
        Self { total, headroom }
    }

    /// Largest file size accepted: the total minus the reserved headroom.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.total.saturating_sub(self.headroom)
    }

    #[inline]
    pub const fn admits(&self, size: u64) -> bool {
        size <= self.limit()
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_BUDGET, RESERVED_HEADROOM)
    }
}

enum Completion {
    Written,
    Cancelled,
}

/// Result of [`Transformer::process`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transformed {
    pub outcome: TransformOutcome,
    /// Whether this call created the output file. A file that was already at
    /// the output path is never touched, so only a created output is the
    /// caller's to clean up.
    pub output_created: bool,
}

/// Reads a file whole, runs the cipher over it and writes the result to a
/// separate output path.
#[derive(Clone, Debug, Default)]
pub struct Transformer {
    budget: MemoryBudget,
}

impl Transformer {
    pub fn new(budget: MemoryBudget) -> Self {
        Self { budget }
    }

    #[inline]
    pub fn budget(&self) -> MemoryBudget {
        self.budget
    }

    /// Transforms `input` into `output`.
    ///
    /// Cancellation is observed before anything is touched and again after
    /// the read, before any output exists. The output must not exist yet; an
    /// existing file there fails the transform and is left as it is. Every
    /// failure is returned as a typed outcome; nothing here panics or
    /// propagates.
    pub async fn process<C>(&self, input: &Path, output: &Path, password: &Password, direction: Direction, cancel: &C) -> Transformed
    where
        C: Cancellation + ?Sized,
    {
        let mut output_created = false;
        let outcome = match self.try_process(input, output, password, direction, cancel, &mut output_created).await {
            Ok(Completion::Written) => TransformOutcome::succeeded(),
            Ok(Completion::Cancelled) => {
                debug!(path = %input.display(), "transform cancelled");
                TransformOutcome::cancelled()
            }
            Err(err) => {
                warn!(path = %input.display(), kind = %err.kind(), "{err}");
                TransformOutcome::from(&err)
            }
        };

        Transformed { outcome, output_created }
    }

    async fn try_process<C>(&self, input: &Path, output: &Path, password: &Password, direction: Direction, cancel: &C, created: &mut bool) -> Result<Completion, TransformError>
    where
        C: Cancellation + ?Sized,
    {
        if cancel.is_cancelled() {
            return Ok(Completion::Cancelled);
        }

        let size = fs::metadata(input).await.map_err(|e| TransformError::access("read metadata of", input, e))?.len();
        if !self.budget.admits(size) {
            return Err(TransformError::TooLarge { size: ByteSize::b(size), limit: ByteSize::b(self.budget.limit()) });
        }

        let data = Zeroizing::new(fs::read(input).await.map_err(|e| TransformError::access("read", input, e))?);

        if cancel.is_cancelled() {
            return Ok(Completion::Cancelled);
        }

        let key = derive_key(password);
        let transformed = task::spawn_blocking(move || {
            let cipher = Cipher::new(key).map_err(TransformError::Key)?;
            cipher.transform(&data, direction).map_err(|e| match direction {
                Direction::Encrypt => TransformError::Encrypt(e),
                Direction::Decrypt => TransformError::Decrypt(e),
            })
        })
        .await
        .map_err(|e| TransformError::Unknown(format!("cipher task failed: {e}")))??;
        let transformed = Zeroizing::new(transformed);

        Self::write_output(output, &transformed, created).await?;

        debug!(input = %input.display(), output = %output.display(), bytes = transformed.len(), "transform written");

        Ok(Completion::Written)
    }

    /// Creates, writes and syncs the output so it is durable before the
    /// original is destroyed. Sets `created` once the file exists.
    async fn write_output(output: &Path, bytes: &[u8], created: &mut bool) -> Result<(), TransformError> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(output).await.map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => TransformError::TempExists(output.to_path_buf()),
            _ => TransformError::access("create", output, e),
        })?;
        *created = true;

        file.write_all(bytes).await.map_err(|e| TransformError::access("write", output, e))?;
        file.sync_all().await.map_err(|e| TransformError::access("sync", output, e))?;
        Ok(())
    }
}
