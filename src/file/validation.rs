//! Default import policy.
//!
//! Which files a user may add is the front end's decision; this is the policy
//! the bundled front end uses, passed to
//! [`FileSet::add_with`](crate::file::FileSet::add_with).

use std::path::Path;

use fast_glob::glob_match;

use crate::config::EXCLUDED_PATTERNS;

/// Hidden by the dot convention. Windows hidden/system attributes are not
/// consulted.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// Editor lock and backup files such as `~$report.docx`.
pub fn is_temporary(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name.to_string_lossy().starts_with('~'))
}

/// Case-insensitive match of the file name against [`EXCLUDED_PATTERNS`].
pub fn is_excluded(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return true;
    };
    let name = name.to_string_lossy().to_lowercase();

    EXCLUDED_PATTERNS.iter().any(|pattern| glob_match(*pattern, &name))
}

pub fn is_eligible(path: &Path) -> bool {
    !is_hidden(path) && !is_temporary(path) && !is_excluded(path)
}
