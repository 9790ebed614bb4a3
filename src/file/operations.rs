use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::config::TEMP_SUFFIX;

/// Sibling path used for the transformed copy of `original`:
/// `report.pdf` becomes `report.pdf.aegis`.
#[inline]
#[must_use]
pub fn temp_path(original: &Path) -> PathBuf {
    let mut name = original.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Whether the file name ends with the reserved temporary suffix.
#[inline]
#[must_use]
pub fn has_reserved_suffix(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name.to_string_lossy().ends_with(TEMP_SUFFIX))
}

/// Removes `path`, treating an already missing file as success.
pub async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_temp_path() {
        assert_eq!(temp_path(Path::new("document.txt")), PathBuf::from("document.txt.aegis"));
        assert_eq!(temp_path(Path::new("/data/noext")), PathBuf::from("/data/noext.aegis"));
    }

    #[test]
    fn test_has_reserved_suffix() {
        assert!(has_reserved_suffix(Path::new("file.txt.aegis")));
        assert!(has_reserved_suffix(Path::new("/tmp/x.aegis")));
        assert!(!has_reserved_suffix(Path::new("file.txt")));
        assert!(!has_reserved_suffix(Path::new("aegis")));
    }

    #[tokio::test]
    async fn test_remove_if_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");

        remove_if_exists(&path).await.unwrap();

        std::fs::write(&path, b"x").unwrap();
        remove_if_exists(&path).await.unwrap();
        assert!(!path.exists());
    }
}
