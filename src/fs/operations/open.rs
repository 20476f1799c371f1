//! Opening handles.

use crate::error::{FsError, Result};
use crate::fs::{File, Fs, OpenFlags};

impl Fs {
    /// Open a path for reading.
    pub async fn open(&self, name: &str) -> Result<File> {
        self.open_file(name, OpenFlags::READ_ONLY, 0).await
    }

    /// Open a path with explicit flags.
    ///
    /// Read-write and append access cannot be expressed on an object store
    /// and fail with [`FsError::NotSupported`]. Write flags return a write
    /// handle without touching the store; anything else stats the path and
    /// returns a directory handle or a lazily-reading file handle. `perm` is
    /// accepted for interface compatibility and ignored.
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn open_file(&self, name: &str, flags: OpenFlags, _perm: u32) -> Result<File> {
        let name = self.sanitize(name);

        if flags.contains(OpenFlags::READ_WRITE) {
            return Err(FsError::not_supported("open", name));
        }
        if flags.contains(OpenFlags::APPEND) {
            return Err(FsError::not_supported("open", name));
        }

        let mut file = File::new(self.clone(), name.as_str());
        if flags.is_write() {
            file.open_write_stream()?;
            return Ok(file);
        }

        let info = self.stat(&name).await.map_err(|e| e.with_op("open"))?;
        let is_dir = info.is_dir();
        let mut file = file.with_info(info);
        if !is_dir {
            file.open_read_stream(0)?;
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use crate::fs::operations::test_support::fs_with;
    use crate::fs::OpenFlags;
    use crate::FsError;

    #[tokio::test]
    async fn test_open_unsupported_modes() {
        let (fs, store) = fs_with(&[("a.txt", b"x")]).await;
        let before = store.round_trips();

        for flags in [
            OpenFlags::READ_WRITE,
            OpenFlags::READ_WRITE | OpenFlags::CREATE,
            OpenFlags::APPEND,
            OpenFlags::WRITE_ONLY | OpenFlags::APPEND,
        ] {
            let err = fs.open_file("a.txt", flags, 0o644).await.unwrap_err();
            assert!(err.is_not_supported(), "{flags:?}");
            assert_eq!(err.op(), Some("open"));
        }
        assert_eq!(store.round_trips(), before);
    }

    #[tokio::test]
    async fn test_open_file_for_reading() {
        let (fs, _) = fs_with(&[("docs/guide.md", b"# Guide\n")]).await;

        let mut file = fs.open("/docs/guide.md").await.unwrap();
        assert_eq!(file.read_to_end().await.unwrap(), b"# Guide\n");
        file.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_directory() {
        let (fs, _) = fs_with(&[("docs/a.md", b"a"), ("docs/b.md", b"b")]).await;

        let mut dir = fs.open("docs").await.unwrap();
        assert_eq!(dir.readdir_names(0).await.unwrap(), vec!["a.md", "b.md"]);

        let mut buf = [0u8; 4];
        assert!(dir.read(&mut buf).await.is_err());
    }

    #[tokio::test]
    async fn test_open_directory_with_trailing_slash() {
        let (fs, _) = fs_with(&[("photos/2024/a.jpg", b"jpg")]).await;
        fs.mkdir("photos", 0o755).await.unwrap();

        let mut dir = fs.open("photos/").await.unwrap();
        assert!(dir.stat().await.unwrap().is_dir());
        assert_eq!(dir.readdir_names(0).await.unwrap(), vec!["2024"]);
    }

    #[tokio::test]
    async fn test_open_marker_holding_data() {
        let (fs, _) = fs_with(&[("weird/", b"payload")]).await;

        let mut dir = fs.open("weird/").await.unwrap();
        let mut buf = [0u8; 8];
        assert!(matches!(
            dir.read(&mut buf).await,
            Err(FsError::NotOpened { .. })
        ));
        assert!(dir.readdir(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_for_write_skips_store() {
        let (fs, store) = fs_with(&[]).await;

        let mut file = fs
            .open_file("new.json", OpenFlags::CREATE | OpenFlags::TRUNCATE, 0o644)
            .await
            .unwrap();
        assert_eq!(store.round_trips(), 0);

        file.write(b"{}").unwrap();
        file.close().await.unwrap();
        let object = store.object("b", "new.json").await.unwrap();
        assert_eq!(object.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_open_missing() {
        let (fs, _) = fs_with(&[]).await;
        let err = fs.open("nope.txt").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.op(), Some("open"));
    }
}
