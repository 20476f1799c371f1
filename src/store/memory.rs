//! In-memory object store.
//!
//! Behaves like a flat key-value bucket: no hierarchy, prefix listings with an
//! optional delimiter, copy by reference and canned ACLs. A visibility lag can
//! be configured to emulate an eventually-consistent store: a freshly written
//! object stays invisible to the next `lag` read probes (head, ranged get or
//! listing) before it shows up.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{
    Acl, ListOutput, ListRequest, ObjectHead, ObjectStore, ObjectSummary, PutObjectRequest,
    StoreError, StoreResult, UploadRequest,
};

/// A stored object and its metadata.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub last_modified: SystemTime,
    pub acl: Option<Acl>,
    pub cache_control: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    hidden_probes: u32,
}

impl StoredObject {
    fn visible(&self) -> bool {
        self.hidden_probes == 0
    }
}

type Bucket = BTreeMap<String, StoredObject>;

/// In-process [`ObjectStore`] backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<String, Bucket>>,
    visibility_lag: u32,
    round_trips: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide every newly written object from the next `probes` reads.
    pub fn with_visibility_lag(mut self, probes: u32) -> Self {
        self.visibility_lag = probes;
        self
    }

    /// Number of store calls served so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Snapshot of an object, ignoring visibility lag.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let buckets = self.buckets.read().await;
        buckets.get(bucket).and_then(|b| b.get(key)).cloned()
    }

    /// All keys currently stored in a bucket, ignoring visibility lag.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn count(&self) {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
    }

    async fn insert(&self, bucket: &str, key: &str, object: StoredObject) {
        let mut buckets = self.buckets.write().await;
        buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), object);
    }

    /// Resolve a key for reading, consuming one hidden probe if the object is
    /// still lagging.
    async fn probe(&self, bucket: &str, key: &str) -> StoreResult<StoredObject> {
        let mut buckets = self.buckets.write().await;
        let object = buckets
            .get_mut(bucket)
            .and_then(|b| b.get_mut(key))
            .ok_or_else(|| StoreError::not_found(bucket, key))?;

        if !object.visible() {
            object.hidden_probes -= 1;
            return Err(StoreError::not_found(bucket, key));
        }
        Ok(object.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    #[tracing::instrument(level = "trace", skip(self, req), fields(bucket = %req.bucket, key = %req.key))]
    async fn put_object(&self, req: PutObjectRequest) -> StoreResult<()> {
        self.count();
        let object = StoredObject {
            body: req.body,
            last_modified: SystemTime::now(),
            acl: req.acl,
            cache_control: req.cache_control,
            content_type: req.content_type,
            content_encoding: req.content_encoding,
            hidden_probes: self.visibility_lag,
        };
        self.insert(&req.bucket, &req.key, object).await;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self, req), fields(bucket = %req.bucket, key = %req.key, size = req.body.len()))]
    async fn upload(&self, req: UploadRequest) -> StoreResult<()> {
        self.count();
        let object = StoredObject {
            body: req.body,
            last_modified: SystemTime::now(),
            acl: req.acl,
            cache_control: req.cache_control,
            content_type: req.content_type,
            content_encoding: req.content_encoding,
            hidden_probes: self.visibility_lag,
        };
        self.insert(&req.bucket, &req.key, object).await;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectHead> {
        self.count();
        let object = self.probe(bucket, key).await?;
        Ok(ObjectHead {
            size: object.body.len() as u64,
            last_modified: object.last_modified,
            content_type: object.content_type,
        })
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn get_object_range(
        &self,
        bucket: &str,
        key: &str,
        offset: u64,
        len: u64,
    ) -> StoreResult<Bytes> {
        self.count();
        let object = self.probe(bucket, key).await?;
        let size = object.body.len() as u64;
        if offset > size || (offset == size && size > 0) {
            return Err(StoreError::InvalidRange {
                bucket: bucket.to_string(),
                key: key.to_string(),
                offset,
            });
        }
        let end = offset.saturating_add(len).min(size);
        Ok(object.body.slice(offset as usize..end as usize))
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.count();
        let mut buckets = self.buckets.write().await;
        if let Some(b) = buckets.get_mut(bucket) {
            b.remove(key);
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self, req), fields(bucket = %req.bucket, prefix = %req.prefix))]
    async fn list_objects(&self, req: ListRequest) -> StoreResult<ListOutput> {
        self.count();
        let mut buckets = self.buckets.write().await;
        let Some(bucket) = buckets.get_mut(&req.bucket) else {
            return Ok(ListOutput::default());
        };

        let max_keys = if req.max_keys == 0 { 1000 } else { req.max_keys };
        let mut output = ListOutput::default();
        let mut last_entry: Option<String> = None;

        for (key, object) in bucket.range_mut(req.prefix.clone()..) {
            if !key.starts_with(&req.prefix) {
                break;
            }
            if !object.visible() {
                object.hidden_probes -= 1;
                continue;
            }

            // Roll up at the first delimiter past the prefix.
            let entry = match &req.delimiter {
                Some(delim) if !delim.is_empty() => key[req.prefix.len()..]
                    .find(delim.as_str())
                    .map(|idx| key[..req.prefix.len() + idx + delim.len()].to_string()),
                _ => None,
            };
            let marker = entry.clone().unwrap_or_else(|| key.clone());

            if let Some(token) = &req.continuation_token {
                if marker.as_str() <= token.as_str() {
                    continue;
                }
            }
            if last_entry.as_deref() == Some(marker.as_str()) {
                continue;
            }

            if output.key_count == max_keys {
                output.is_truncated = true;
                output.next_continuation_token = last_entry.clone();
                break;
            }

            match entry {
                Some(prefix) => output.common_prefixes.push(prefix),
                None => output.objects.push(ObjectSummary {
                    key: key.clone(),
                    size: object.body.len() as u64,
                    last_modified: object.last_modified,
                }),
            }
            output.key_count += 1;
            last_entry = Some(marker);
        }

        Ok(output)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn copy_object(&self, bucket: &str, source_key: &str, dest_key: &str) -> StoreResult<()> {
        self.count();
        let mut object = self.probe(bucket, source_key).await?;
        object.last_modified = SystemTime::now();
        object.hidden_probes = self.visibility_lag;
        self.insert(bucket, dest_key, object).await;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn put_object_acl(&self, bucket: &str, key: &str, acl: Acl) -> StoreResult<()> {
        self.count();
        let mut buckets = self.buckets.write().await;
        let object = buckets
            .get_mut(bucket)
            .and_then(|b| b.get_mut(key))
            .ok_or_else(|| StoreError::not_found(bucket, key))?;
        object.acl = Some(acl);
        Ok(())
    }
}
