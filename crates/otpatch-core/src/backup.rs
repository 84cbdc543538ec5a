//! Pre-mutation backup of the target binary.
//!
//! The backup is the only side effect allowed before the final write: an
//! additional `BKP<timestamp>-<name>` file next to the target, holding the
//! untouched bytes. The engine never reads it back; it exists for manual
//! recovery.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};

/// Sibling path `BKP<ts>-<basename>` for a given target and Unix timestamp.
pub fn backup_path(target: &Path, timestamp: i64) -> Result<PathBuf> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            Error::Config(format!("Target path has no file name: {}", target.display()))
        })?;

    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join(format!("BKP{timestamp}-{file_name}")))
}

/// Write `bytes` to a timestamped backup next to `target`.
pub fn write_backup(target: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let path = backup_path(target, Utc::now().timestamp())?;
    fs::write(&path, bytes)?;
    info!("Backed up {} to {}", target.display(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path_shape() {
        let path = backup_path(Path::new("/games/client/Tibia.exe"), 1700000000).unwrap();
        assert_eq!(path, Path::new("/games/client/BKP1700000000-Tibia.exe"));
    }

    #[test]
    fn test_backup_path_rejects_bare_root() {
        assert!(backup_path(Path::new("/"), 0).is_err());
    }

    #[test]
    fn test_write_backup_preserves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("client.exe");
        let original = b"\x4d\x5aoriginal bytes".to_vec();
        fs::write(&target, &original).unwrap();

        let backup = write_backup(&target, &original).unwrap();
        assert_eq!(fs::read(&backup).unwrap(), original);

        let name = backup.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("BKP"));
        assert!(name.ends_with("-client.exe"));
    }
}
