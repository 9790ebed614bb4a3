//! The deduplicated working set of files queued for a batch run.

use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use tokio::fs;
use tracing::debug;

use crate::file::ManagedFile;
use crate::file::operations::has_reserved_suffix;

/// A candidate that collided with a file already in the set.
#[derive(Clone, Debug)]
pub struct DuplicateEntry {
    /// Path as the caller supplied it.
    pub attempted: PathBuf,
    pub existing: ManagedFile,
}

/// Why a candidate was not added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Carries the temporary suffix and could collide with a transform output.
    ReservedSuffix,
    /// Refused by the caller's accept predicate.
    Filtered,
    NotAFile,
    Inaccessible(String),
}

impl Display for RejectReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedSuffix => f.write_str("reserved temporary suffix"),
            Self::Filtered => f.write_str("excluded by import policy"),
            Self::NotAFile => f.write_str("not a regular file"),
            Self::Inaccessible(msg) => write!(f, "inaccessible: {msg}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Rejected {
    pub path: PathBuf,
    pub reason: RejectReason,
}

/// Result of one [`FileSet::add`] call.
#[derive(Clone, Debug, Default)]
pub struct AddResult {
    pub added: Vec<ManagedFile>,
    pub duplicates: Vec<DuplicateEntry>,
    pub rejected: Vec<Rejected>,
}

/// Ordered working set, unique by canonical path.
///
/// Uniqueness is enforced on insertion only. `remove` and `clear` drop
/// entries and never touch the filesystem.
#[derive(Clone, Debug, Default)]
pub struct FileSet {
    files: Vec<ManagedFile>,
    index: HashSet<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every candidate that is a regular file, is not already present and
    /// does not carry the reserved suffix.
    pub async fn add<I, P>(&mut self, paths: I) -> AddResult
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.add_with(paths, |_| true).await
    }

    /// Like [`add`](Self::add), additionally skipping candidates for which
    /// `accept` returns false. The predicate sees the path as supplied.
    pub async fn add_with<I, P, F>(&mut self, paths: I, accept: F) -> AddResult
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
        F: Fn(&Path) -> bool,
    {
        let mut result = AddResult::default();

        for candidate in paths {
            let candidate = candidate.as_ref();

            if !accept(candidate) {
                result.rejected.push(Rejected { path: candidate.to_path_buf(), reason: RejectReason::Filtered });
                continue;
            }

            let canonical = match fs::canonicalize(candidate).await {
                Ok(path) => path,
                Err(e) => {
                    result.rejected.push(Rejected { path: candidate.to_path_buf(), reason: RejectReason::Inaccessible(e.to_string()) });
                    continue;
                }
            };

            if has_reserved_suffix(candidate) || has_reserved_suffix(&canonical) {
                result.rejected.push(Rejected { path: candidate.to_path_buf(), reason: RejectReason::ReservedSuffix });
                continue;
            }

            if let Some(existing) = self.get(&canonical) {
                debug!(path = %candidate.display(), "duplicate skipped");
                result.duplicates.push(DuplicateEntry { attempted: candidate.to_path_buf(), existing: existing.clone() });
                continue;
            }

            match ManagedFile::from_canonical(canonical).await {
                Ok(file) => {
                    self.index.insert(file.path().to_path_buf());
                    self.files.push(file.clone());
                    result.added.push(file);
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
                    result.rejected.push(Rejected { path: candidate.to_path_buf(), reason: RejectReason::NotAFile });
                }
                Err(e) => {
                    result.rejected.push(Rejected { path: candidate.to_path_buf(), reason: RejectReason::Inaccessible(e.to_string()) });
                }
            }
        }

        result
    }

    /// Drops the entries whose paths appear in `selection`, returning them.
    ///
    /// Paths are compared as given, so pass paths taken from the set itself.
    pub fn remove(&mut self, selection: &[PathBuf]) -> Vec<ManagedFile> {
        let selected: HashSet<&Path> = selection.iter().map(PathBuf::as_path).collect();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files).into_iter().partition(|f| selected.contains(f.path()));

        for file in &removed {
            self.index.remove(file.path());
        }
        self.files = kept;

        removed
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.index.clear();
    }

    pub fn get(&self, path: &Path) -> Option<&ManagedFile> {
        if !self.index.contains(path) {
            return None;
        }
        self.files.iter().find(|f| f.path() == path)
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains(path)
    }

    #[inline]
    pub fn files(&self) -> &[ManagedFile] {
        &self.files
    }

    /// Mutable view for a batch run. The borrow keeps the set from being
    /// edited while the run is in flight.
    #[inline]
    pub fn files_mut(&mut self) -> &mut [ManagedFile] {
        &mut self.files
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedFile> {
        self.files.iter()
    }
}
