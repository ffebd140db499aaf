use anyhow::{Context, Result};
use std::path::Path;

/// Write `text` verbatim to `path`, replacing any existing file.
///
/// The parent directory is created first if it does not exist.
pub fn write_draft(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    std::fs::write(path, text)
        .with_context(|| format!("Failed to write draft: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_parent_and_writes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("skill_set/nested/guide.md");
        write_draft(&path, "# Guide\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Guide\n");
    }

    #[test]
    fn overwrites_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("guide.md");
        std::fs::write(&path, "old and much longer content").unwrap();
        write_draft(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn empty_draft_is_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("guide.md");
        write_draft(&path, "").unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn directory_target_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = write_draft(tmp.path(), "x").unwrap_err();
        assert!(err.to_string().contains("Failed to write draft"));
    }
}
