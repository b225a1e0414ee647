//! Local filesystem probing.
//!
//! Restore refuses to touch a target directory that is missing,
//! unreadable, or already populated, and those checks run before any
//! duplicity process is spawned. The probe is a trait so driver tests
//! can exercise the precondition paths without a real filesystem.

use std::path::Path;

/// Read-only directory checks consumed by the command builder.
pub trait DirectoryProbe {
    /// Whether the path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Whether the directory can be read.
    fn is_readable(&self, path: &Path) -> bool;

    /// Whether the directory has no entries. `None` when the answer is
    /// unknowable because the directory cannot be read.
    fn is_empty(&self, path: &Path) -> Option<bool>;
}

/// [`DirectoryProbe`] backed by `std::fs`.
#[derive(Debug, Default)]
pub struct SystemProbe;

impl DirectoryProbe for SystemProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_readable(&self, path: &Path) -> bool {
        std::fs::read_dir(path).is_ok()
    }

    fn is_empty(&self, path: &Path) -> Option<bool> {
        match std::fs::read_dir(path) {
            Ok(mut entries) => Some(entries.next().is_none()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_probe_empty_directory() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let probe = SystemProbe;

        assert!(probe.exists(temp_dir.path()));
        assert!(probe.is_readable(temp_dir.path()));
        assert_eq!(probe.is_empty(temp_dir.path()), Some(true));

        Ok(())
    }

    #[test]
    fn test_probe_populated_directory() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("leftover.txt"), b"data")?;
        let probe = SystemProbe;

        assert_eq!(probe.is_empty(temp_dir.path()), Some(false));

        Ok(())
    }

    #[test]
    fn test_probe_missing_directory() {
        let probe = SystemProbe;
        let path = Path::new("/nonexistent_path_12345");

        assert!(!probe.exists(path));
        assert!(!probe.is_readable(path));
        assert_eq!(probe.is_empty(path), None);
    }
}
