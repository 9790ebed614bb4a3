use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;

use crate::file::operations::temp_path;
use crate::types::{FileStatus, TransformOutcome};

/// One file in the working set.
///
/// Identity is the canonical absolute path; two `ManagedFile`s compare equal
/// exactly when their paths do.
#[derive(Clone, Debug)]
pub struct ManagedFile {
    path: PathBuf,
    size: u64,
    modified: Option<SystemTime>,
    read_only: bool,
    last_result: Option<TransformOutcome>,
}

impl ManagedFile {
    /// Resolves `path` and reads its metadata.
    ///
    /// Fails with [`io::ErrorKind::InvalidInput`] if the path exists but is not
    /// a regular file.
    pub async fn open(path: &Path) -> io::Result<Self> {
        let path = fs::canonicalize(path).await?;
        Self::from_canonical(path).await
    }

    pub(crate) async fn from_canonical(path: PathBuf) -> io::Result<Self> {
        let meta = fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("not a regular file: {}", path.display())));
        }

        Ok(Self { path, size: meta.len(), modified: meta.modified().ok(), read_only: meta.permissions().readonly(), last_result: None })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, for display.
    pub fn name(&self) -> String {
        self.path.file_name().map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Size in bytes as of insertion or the last successful transform.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Sibling path the transformer writes to for this file.
    pub fn temp_path(&self) -> PathBuf {
        temp_path(&self.path)
    }

    /// Outcome of the last batch run that processed this file, `None` until
    /// one has.
    #[inline]
    pub fn last_result(&self) -> Option<&TransformOutcome> {
        self.last_result.as_ref()
    }

    pub fn status(&self) -> FileStatus {
        match &self.last_result {
            None => FileStatus::Pending,
            Some(outcome) if outcome.is_success() => FileStatus::Succeeded,
            Some(outcome) if outcome.is_cancelled() => FileStatus::Cancelled,
            Some(outcome) => FileStatus::Failed(outcome.error()),
        }
    }

    pub(crate) fn record(&mut self, outcome: TransformOutcome) {
        self.last_result = Some(outcome);
    }

    /// Re-reads size, modification time and permissions from disk.
    pub async fn refresh(&mut self) -> io::Result<()> {
        let meta = fs::metadata(&self.path).await?;
        self.size = meta.len();
        self.modified = meta.modified().ok();
        self.read_only = meta.permissions().readonly();
        Ok(())
    }
}

impl PartialEq for ManagedFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ManagedFile {}

impl Hash for ManagedFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}
