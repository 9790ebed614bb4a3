//! Promotion of a transformed file over its original.
//!
//! After a successful transform the original's bytes are overwritten in place
//! (zeros, then random data), the original is deleted and the temporary file
//! is renamed onto its name. After a failed transform only the temporary file
//! is removed.
//!
//! The overwrite is best-effort. Journaling filesystems, copy-on-write
//! snapshots and SSD wear levelling can all keep old blocks around.

use std::io::SeekFrom;
use std::path::Path;

use rand::rand_core::{OsRng, TryRngCore};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::config::ERASE_CHUNK_SIZE;
use crate::error::EraseError;
use crate::file::operations::remove_if_exists;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Zeros,
    Random,
}

/// Finishes one file after its transform.
///
/// With `succeeded` the replacement at `temp` takes over `original`'s name. A
/// failed delete or rename is returned without rollback and the replacement
/// stays at `temp`. Without `succeeded` the original is not touched at all and
/// `temp` is removed, so only pass a `temp` that the failed transform created.
pub async fn finalize(original: &Path, temp: &Path, succeeded: bool) -> Result<(), EraseError> {
    if !succeeded {
        return remove_if_exists(temp).await.map_err(|source| EraseError::Cleanup { temp: temp.to_path_buf(), source });
    }

    if let Err(e) = overwrite(original).await {
        warn!(path = %original.display(), "overwrite before delete failed: {e}");
    }

    remove_if_exists(original).await.map_err(|source| EraseError::Delete { original: original.to_path_buf(), temp: temp.to_path_buf(), source })?;

    fs::rename(temp, original).await.map_err(|source| EraseError::Rename { original: original.to_path_buf(), temp: temp.to_path_buf(), source })?;

    debug!(path = %original.display(), "replacement promoted");
    Ok(())
}

/// Overwrites the file's current length with zeros, then with random bytes,
/// syncing after each pass. The length never changes.
pub async fn overwrite(path: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).open(path).await?;
    let len = file.metadata().await?.len();

    let mut chunk = vec![0u8; ERASE_CHUNK_SIZE];
    let result = async {
        write_pass(&mut file, len, Pass::Zeros, &mut chunk).await?;
        write_pass(&mut file, len, Pass::Random, &mut chunk).await
    }
    .await;

    chunk.zeroize();
    result
}

/// One full-length pass from the start of `file`, then `sync_all`.
async fn write_pass(file: &mut File, len: u64, pass: Pass, chunk: &mut [u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(0)).await?;

    let mut remaining = len;
    while remaining > 0 {
        let n = usize::try_from(remaining).map_or(chunk.len(), |r| r.min(chunk.len()));
        match pass {
            Pass::Zeros => chunk[..n].fill(0),
            Pass::Random => OsRng.try_fill_bytes(&mut chunk[..n]).map_err(std::io::Error::other)?,
        }
        file.write_all(&chunk[..n]).await?;
        remaining -= n as u64;
    }

    file.flush().await?;
    file.sync_all().await
}
