//! The filesystem handle.

use std::fmt;
use std::sync::Arc;

use crate::config::FsConfig;
use crate::error::{FsError, Result};
use crate::fs::path::{key_of, sanitize};
use crate::fs::props::{guess_content_type, UploadedFileProperties};
use crate::store::{ObjectStore, PutObjectRequest, UploadRequest, WaitPolicy};

/// Filesystem view over one bucket of an object store.
///
/// The handle holds configuration only: the store is shared (`Arc`), and no
/// call mutates the handle, so clones can be used from any number of tasks at
/// once. Operations live in the `operations` modules.
#[derive(Clone)]
pub struct Fs {
    pub(crate) bucket: String,
    pub(crate) file_props: Option<UploadedFileProperties>,
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) raw_mode: bool,
    pub(crate) wait: WaitPolicy,
}

impl fmt::Debug for Fs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fs")
            .field("bucket", &self.bucket)
            .field("file_props", &self.file_props)
            .field("raw_mode", &self.raw_mode)
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

impl Fs {
    /// Create a filesystem writing to `bucket` through `store`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use bucketfs::{Fs, MemoryStore};
    ///
    /// let fs = Fs::new("assets", Arc::new(MemoryStore::new()));
    /// assert_eq!(fs.bucket(), "assets");
    /// ```
    pub fn new(bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            file_props: None,
            store,
            raw_mode: false,
            wait: WaitPolicy::default(),
        }
    }

    /// Create a filesystem from a validated configuration.
    pub fn from_config(config: FsConfig, store: Arc<dyn ObjectStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bucket: config.bucket,
            file_props: config.file_props,
            store,
            raw_mode: config.raw_mode,
            wait: config.wait,
        })
    }

    /// Properties applied to every object this handle creates.
    pub fn with_file_props(mut self, props: UploadedFileProperties) -> Self {
        self.file_props = Some(props);
        self
    }

    /// Disable path sanitation.
    pub fn with_raw_mode(mut self, raw_mode: bool) -> Self {
        self.raw_mode = raw_mode;
        self
    }

    /// Readiness wait used by [`create`](Self::create).
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Filesystem type name.
    pub fn name(&self) -> &'static str {
        "s3"
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn file_props(&self) -> Option<&UploadedFileProperties> {
        self.file_props.as_ref()
    }

    pub fn raw_mode(&self) -> bool {
        self.raw_mode
    }

    pub fn wait_policy(&self) -> &WaitPolicy {
        &self.wait
    }

    /// The shared store client.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Sanitize a path unless the handle is in raw mode.
    pub(crate) fn sanitize(&self, name: &str) -> String {
        if self.raw_mode {
            return name.to_string();
        }
        sanitize(name)
    }

    /// Empty-body write of `path` with the default properties and a guessed
    /// content type.
    pub(crate) async fn put_empty(&self, op: &'static str, path: &str) -> Result<()> {
        let mut req = PutObjectRequest::new(self.bucket.as_str(), key_of(path), Vec::new());
        if let Some(props) = &self.file_props {
            props.apply_to_put(&mut req);
        }
        if req.content_type.is_none() {
            req.content_type = guess_content_type(path);
        }

        tracing::debug!(bucket = %self.bucket, key = %req.key, "put empty object");
        self.store
            .put_object(req)
            .await
            .map_err(|e| FsError::store(op, path, e))
    }

    /// Upload the full body of a write stream.
    pub(crate) async fn upload_body(&self, op: &'static str, path: &str, body: Vec<u8>) -> Result<()> {
        let mut req = UploadRequest::new(self.bucket.as_str(), key_of(path), body);
        if let Some(props) = &self.file_props {
            props.apply_to_upload(&mut req);
        }
        if req.content_type.is_none() {
            req.content_type = guess_content_type(path);
        }

        tracing::debug!(bucket = %self.bucket, key = %req.key, size = req.body.len(), "upload object");
        self.store
            .upload(req)
            .await
            .map_err(|e| FsError::store(op, path, e))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::{Acl, MemoryStore};

    #[test]
    fn test_sanitize_respects_raw_mode() {
        let store = Arc::new(MemoryStore::new());
        let fs = Fs::new("b", store.clone());
        assert_eq!(fs.sanitize(r"C:\a\b"), "/a/b");

        let raw = Fs::new("b", store).with_raw_mode(true);
        assert_eq!(raw.sanitize(r"C:\a\b"), r"C:\a\b");
    }

    #[test]
    fn test_from_config() {
        let mut config = FsConfig::new("assets");
        config.file_props = Some(UploadedFileProperties::default().with_acl(Acl::Private));
        config.wait = WaitPolicy::fixed(2, Duration::from_millis(5));

        let fs = Fs::from_config(config, Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(fs.bucket(), "assets");
        assert_eq!(fs.file_props().and_then(|p| p.acl), Some(Acl::Private));
        assert_eq!(fs.wait_policy().max_attempts, 2);
        assert_eq!(fs.name(), "s3");

        let err = Fs::from_config(FsConfig::default(), Arc::new(MemoryStore::new())).unwrap_err();
        assert!(matches!(err, FsError::Config(_)));
    }

    #[tokio::test]
    async fn test_put_empty_applies_props() {
        let store = Arc::new(MemoryStore::new());
        let fs = Fs::new("b", store.clone())
            .with_file_props(UploadedFileProperties::default().with_cache_control("no-store"));

        fs.put_empty("create", "/site/index.html").await.unwrap();

        let object = store.object("b", "site/index.html").await.unwrap();
        assert_eq!(object.cache_control.as_deref(), Some("no-store"));
        assert_eq!(object.content_type.as_deref(), Some("text/html"));
        assert!(object.body.is_empty());
    }
}
