//! Deletion.

use futures::future::{BoxFuture, FutureExt};

use crate::error::{FsError, Result};
use crate::fs::path::key_of;
use crate::fs::{File, Fs};

impl Fs {
    /// Delete a single path.
    ///
    /// The path is resolved first so a missing path fails with a not-found
    /// error. For a directory only its marker is deleted; entries below it
    /// keep the prefix alive.
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn remove(&self, name: &str) -> Result<()> {
        let name = self.sanitize(name);
        let info = self.stat(&name).await.map_err(|e| e.with_op("remove"))?;

        if info.is_dir() {
            return self.force_remove("remove", &marker_of(&name)).await;
        }
        self.force_remove("remove", &name).await
    }

    /// Delete a path and everything below it.
    ///
    /// Entries are removed depth first, then the directory's own marker. A
    /// plain object at the path itself is removed too. Missing paths succeed.
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn remove_all(&self, name: &str) -> Result<()> {
        let name = self.sanitize(name);
        let key = key_of(&name).trim_end_matches('/');
        if key.is_empty() {
            return self.remove_tree(String::new()).await;
        }

        self.remove_tree(format!("{key}/")).await?;
        self.delete_key("remove_all", key).await
    }

    /// Walk the listing under `prefix` by the keys the store reports, so
    /// unusual keys such as `dir//x` are reached exactly as stored.
    fn remove_tree(&self, prefix: String) -> BoxFuture<'_, Result<()>> {
        async move {
            let mut handle = File::at_key(self.clone(), prefix.as_str());
            let entries = handle
                .readdir_keyed()
                .await
                .map_err(|e| e.with_op("remove_all"))?;

            for (key, entry) in entries {
                if entry.is_dir() {
                    self.remove_tree(key).await?;
                } else {
                    self.delete_key("remove_all", &key).await?;
                }
            }

            if prefix.is_empty() {
                return Ok(());
            }
            self.delete_key("remove_all", &prefix).await
        }
        .boxed()
    }

    /// Delete the object at `path` without resolving it first.
    pub(crate) async fn force_remove(&self, op: &'static str, path: &str) -> Result<()> {
        self.delete_key(op, key_of(path)).await
    }

    async fn delete_key(&self, op: &'static str, key: &str) -> Result<()> {
        tracing::debug!(bucket = %self.bucket, key, "delete object");
        self.store
            .delete_object(&self.bucket, key)
            .await
            .map_err(|e| FsError::store(op, key, e))
    }
}

/// Marker key path for a directory: exactly one trailing separator.
fn marker_of(dir: &str) -> String {
    format!("{}/", dir.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::marker_of;
    use crate::fs::operations::test_support::fs_with;

    #[test]
    fn test_marker_of() {
        assert_eq!(marker_of("dir"), "dir/");
        assert_eq!(marker_of("dir/"), "dir/");
        assert_eq!(marker_of("/a/b//"), "/a/b/");
    }

    #[tokio::test]
    async fn test_remove_file() {
        let (fs, store) = fs_with(&[("a.txt", b"a"), ("b.txt", b"b")]).await;

        fs.remove("/a.txt").await.unwrap();
        assert_eq!(store.keys("b").await, vec!["b.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_missing() {
        let (fs, _) = fs_with(&[]).await;

        let err = fs.remove("ghost.txt").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.op(), Some("remove"));
    }

    #[tokio::test]
    async fn test_remove_empty_directory() {
        let (fs, store) = fs_with(&[("empty/", b"")]).await;

        fs.remove("empty").await.unwrap();
        assert!(store.keys("b").await.is_empty());
        assert!(fs.stat("empty").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove_all_tree() {
        let (fs, store) = fs_with(&[
            ("dir/", b""),
            ("dir/a", b"1"),
            ("dir/sub/", b""),
            ("dir/sub/b", b"2"),
            ("dirty", b"keep"),
            ("other/c", b"keep"),
        ])
        .await;

        fs.remove_all("dir").await.unwrap();

        assert_eq!(
            store.keys("b").await,
            vec!["dirty".to_string(), "other/c".to_string()]
        );
        assert!(fs.stat("dir/").await.unwrap_err().is_not_found());
        assert!(fs.stat("dir/sub").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove_all_follows_listed_keys() {
        let (fs, store) = fs_with(&[
            ("dir/", b""),
            ("dir//x", b"1"),
            ("dir/a", b"2"),
            ("dir/dir/", b""),
            ("dirt", b"keep"),
        ])
        .await;

        fs.remove_all("dir").await.unwrap();

        assert_eq!(store.keys("b").await, vec!["dirt".to_string()]);
        assert!(fs.stat("dir/").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove_all_plain_file_and_missing() {
        let (fs, store) = fs_with(&[("notes.txt", b"x")]).await;

        fs.remove_all("notes.txt").await.unwrap();
        assert!(store.keys("b").await.is_empty());

        fs.remove_all("never/existed").await.unwrap();
    }
}
