//! Stat records synthesized from object-store lookups.

use std::time::{SystemTime, UNIX_EPOCH};

/// Permission bits reported for synthesized directories.
pub const DIR_MODE: u32 = 0o755;
/// Permission bits reported for files.
pub const FILE_MODE: u32 = 0o664;
/// Directory type bit, matching `S_IFDIR`.
pub const MODE_DIR: u32 = 0o040000;

/// Result of a stat-like query.
///
/// Built fresh from a point lookup or a prefix listing and never cached:
/// every stat re-derives it from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    name: String,
    is_dir: bool,
    size: u64,
    modified: SystemTime,
}

impl FileInfo {
    /// A plain file.
    pub fn file(name: impl Into<String>, size: u64, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            size,
            modified,
        }
    }

    /// A directory synthesized from a key prefix: zero size, epoch time.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            size: 0,
            modified: UNIX_EPOCH,
        }
    }

    /// Base name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Size in bytes (0 for directories).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last-modified time (Unix epoch for directories).
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// POSIX-style mode: type bit plus fixed permission bits.
    pub fn mode(&self) -> u32 {
        if self.is_dir {
            MODE_DIR | DIR_MODE
        } else {
            FILE_MODE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_directory_record() {
        let dir = FileInfo::directory("photos");
        assert!(dir.is_dir());
        assert!(!dir.is_file());
        assert_eq!(dir.size(), 0);
        assert_eq!(dir.modified(), UNIX_EPOCH);
        assert_eq!(dir.mode(), 0o040755);
    }

    #[test]
    fn test_file_record() {
        let at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let file = FileInfo::file("a.txt", 42, at);
        assert!(file.is_file());
        assert_eq!(file.name(), "a.txt");
        assert_eq!(file.size(), 42);
        assert_eq!(file.modified(), at);
        assert_eq!(file.mode(), 0o664);
    }
}
