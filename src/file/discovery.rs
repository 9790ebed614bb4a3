use std::path::PathBuf;

use walkdir::WalkDir;

/// Expands directories into the regular files beneath them.
///
/// Plain paths are passed through untouched, in order. A directory is
/// replaced by its files in file-name order; entries that cannot be read are
/// skipped.
pub fn expand<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut files = Vec::new();

    for path in paths {
        let path = path.into();
        if path.is_dir() {
            files.extend(
                WalkDir::new(&path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_file())
                    .map(walkdir::DirEntry::into_path),
            );
        } else {
            files.push(path);
        }
    }

    files
}
