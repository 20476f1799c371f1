//! Metadata resolution.

use crate::error::{FsError, Result};
use crate::fs::path::{base, key_of};
use crate::fs::{FileInfo, Fs};
use crate::store::ListRequest;

impl Fs {
    /// Resolve a path to a file or directory record.
    ///
    /// A point lookup on the key comes first. When no object sits at the key
    /// the path is treated as a directory and resolved by listing its prefix.
    /// Records are rebuilt on every call.
    #[tracing::instrument(level = "debug", skip(self), fields(bucket = %self.bucket))]
    pub async fn stat(&self, name: &str) -> Result<FileInfo> {
        let name = self.sanitize(name);
        let key = key_of(&name);
        if key.is_empty() {
            return self.stat_directory(&name).await;
        }

        match self.store.head_object(&self.bucket, key).await {
            Ok(head) => {
                if name.ends_with('/') {
                    // An object at a separator-terminated key is a directory marker.
                    tracing::debug!(key, "marker object found at directory path");
                    return Ok(FileInfo::directory(base(&name)));
                }
                Ok(FileInfo::file(base(&name), head.size, head.last_modified))
            }
            Err(e) if e.is_not_found() => self.stat_directory(&name).await,
            Err(e) => Err(FsError::store("stat", name.as_str(), e)),
        }
    }

    async fn stat_directory(&self, name: &str) -> Result<FileInfo> {
        let dir = key_of(name).trim_end_matches('/');
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let out = self
            .store
            .list_objects(ListRequest {
                bucket: self.bucket.clone(),
                prefix,
                delimiter: None,
                max_keys: 1,
                continuation_token: None,
            })
            .await
            .map_err(|e| FsError::store("stat", name, e))?;

        let empty = out.key_count == 0 && out.objects.is_empty() && out.common_prefixes.is_empty();
        if empty && !name.is_empty() {
            return Err(FsError::not_found("stat", name));
        }
        Ok(FileInfo::directory(base(name)))
    }
}
