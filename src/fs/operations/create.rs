//! Creating files and directories.

use crate::error::{FsError, Result};
use crate::fs::path::{clean, key_of};
use crate::fs::{File, Fs, OpenFlags};

impl Fs {
    /// Create an empty file and return a write handle for it.
    ///
    /// An empty object is written first so the path exists immediately; the
    /// call then waits until a point lookup sees it. Data written to the
    /// returned handle replaces the empty object on [`File::close`].
    ///
    /// # Example
    /// ```
    /// # use std::sync::Arc;
    /// # use bucketfs::{Fs, MemoryStore};
    /// # #[tokio::main]
    /// # async fn main() -> bucketfs::Result<()> {
    /// let fs = Fs::new("assets", Arc::new(MemoryStore::new()));
    /// let mut file = fs.create("/docs/readme.md").await?;
    /// file.write_str("# hello")?;
    /// file.close().await?;
    /// assert_eq!(fs.stat("/docs/readme.md").await?.size(), 7);
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn create(&self, name: &str) -> Result<File> {
        let name = self.sanitize(name);
        self.put_empty("create", &name).await?;

        let file = self.open_file(&name, OpenFlags::WRITE_ONLY, 0o750).await?;

        self.store
            .wait_until_object_exists(&self.bucket, key_of(&name), &self.wait)
            .await
            .map_err(|e| FsError::store("create", name.as_str(), e))?;

        Ok(file)
    }

    /// Create a directory by writing a zero-byte marker `<dir>/`.
    ///
    /// Parents need not exist; the root always does.
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn mkdir(&self, name: &str, _perm: u32) -> Result<()> {
        let name = self.sanitize(name);
        let dir = clean(&name);
        if key_of(&dir).is_empty() || dir == "." {
            tracing::debug!("root directory always exists");
            return Ok(());
        }

        let marker = format!("{dir}/");
        self.put_empty("mkdir", &marker).await
    }

    /// Same as [`mkdir`](Self::mkdir): parents are implied by key prefixes.
    pub async fn mkdir_all(&self, name: &str, perm: u32) -> Result<()> {
        self.mkdir(name, perm).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::fs::operations::test_support::{fs_with, seeded};
    use crate::store::{MemoryStore, WaitPolicy};
    use crate::FsError;

    #[tokio::test]
    async fn test_create_is_visible_despite_lag() {
        let (fs, store) = seeded(MemoryStore::new().with_visibility_lag(3), &[]).await;

        let file = fs.create("reports/q1.csv").await.unwrap();
        assert_eq!(file.name(), "reports/q1.csv");

        let info = fs.stat("reports/q1.csv").await.unwrap();
        assert!(info.is_file());
        assert_eq!(info.size(), 0);

        let object = store.object("b", "reports/q1.csv").await.unwrap();
        assert_eq!(object.content_type.as_deref(), Some("text/csv"));
    }

    #[tokio::test]
    async fn test_create_gives_up_after_wait_policy() {
        let (fs, _) = seeded(MemoryStore::new().with_visibility_lag(50), &[]).await;
        let fs = fs.with_wait_policy(WaitPolicy::fixed(2, Duration::from_millis(1)));

        let err = fs.create("slow.txt").await.unwrap_err();
        assert_eq!(err.op(), Some("create"));
        assert!(matches!(err, FsError::Path { .. }));
    }

    #[tokio::test]
    async fn test_create_then_write() {
        let (fs, store) = fs_with(&[]).await;

        let mut file = fs.create(r"C:\logs\app.log").await.unwrap();
        file.write(b"started\n").unwrap();
        file.close().await.unwrap();

        let object = store.object("b", "logs/app.log").await.unwrap();
        assert_eq!(&object.body[..], b"started\n");
    }

    #[tokio::test]
    async fn test_mkdir_writes_marker() {
        let (fs, store) = fs_with(&[]).await;

        fs.mkdir("photos/2024", 0o755).await.unwrap();
        fs.mkdir_all("/photos/2024/", 0o755).await.unwrap();

        assert_eq!(store.keys("b").await, vec!["photos/2024/".to_string()]);
        assert!(fs.stat("photos/2024").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_mkdir_root_is_noop() {
        let (fs, store) = fs_with(&[]).await;
        fs.mkdir("/", 0o755).await.unwrap();
        fs.mkdir("", 0o755).await.unwrap();
        assert_eq!(store.round_trips(), 0);
    }
}
