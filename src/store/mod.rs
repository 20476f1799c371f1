//! Object-store capability consumed by the filesystem facade.
//!
//! The facade only ever talks to a store through the [`ObjectStore`] trait,
//! held as a shared `Arc<dyn ObjectStore>`. Backends:
//!
//! - [`MemoryStore`]: in-process store with a configurable visibility lag,
//!   used by the tests and demos.
//! - `S3Store` (feature `s3`): Amazon S3 through `aws-sdk-s3`.

pub mod error;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;
pub mod wait;

use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
#[cfg(feature = "s3")]
pub use s3::{S3Config, S3Store};
pub use wait::WaitPolicy;

/// Canned access-control level applied to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl Acl {
    /// Wire name of the canned ACL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
            Acl::PublicReadWrite => "public-read-write",
            Acl::AuthenticatedRead => "authenticated-read",
            Acl::BucketOwnerRead => "bucket-owner-read",
            Acl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-shot object write.
#[derive(Debug, Clone, Default)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
    pub acl: Option<Acl>,
    pub cache_control: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

impl PutObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body: body.into(),
            ..Default::default()
        }
    }
}

/// Streamed upload issued when a write handle is closed.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
    pub acl: Option<Acl>,
    pub cache_control: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

impl UploadRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body: body.into(),
            ..Default::default()
        }
    }
}

/// Result of a point metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub size: u64,
    pub last_modified: SystemTime,
    pub content_type: Option<String>,
}

/// Prefix listing query.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub bucket: String,
    pub prefix: String,
    /// Roll keys up into common prefixes at this separator
    pub delimiter: Option<String>,
    /// Upper bound on keys plus common prefixes returned
    pub max_keys: usize,
    pub continuation_token: Option<String>,
}

/// One object returned by a prefix listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: SystemTime,
}

/// Prefix listing result.
#[derive(Debug, Clone, Default)]
pub struct ListOutput {
    pub objects: Vec<ObjectSummary>,
    pub common_prefixes: Vec<String>,
    pub key_count: usize,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

/// Key-addressed object store.
///
/// Implementations must be safe to share between tasks; the facade never
/// holds store resources across calls.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, req: PutObjectRequest) -> StoreResult<()>;

    /// Whole-body upload used when a write handle closes. Backends may cap
    /// the body size (S3 single PUT: 5 GiB).
    async fn upload(&self, req: UploadRequest) -> StoreResult<()>;

    /// Point metadata lookup. A missing key is [`StoreError::NotFound`].
    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectHead>;

    /// Read at most `len` bytes starting at `offset`.
    async fn get_object_range(
        &self,
        bucket: &str,
        key: &str,
        offset: u64,
        len: u64,
    ) -> StoreResult<Bytes>;

    /// Delete a key. Deleting a missing key succeeds.
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;

    async fn list_objects(&self, req: ListRequest) -> StoreResult<ListOutput>;

    async fn copy_object(&self, bucket: &str, source_key: &str, dest_key: &str) -> StoreResult<()>;

    async fn put_object_acl(&self, bucket: &str, key: &str, acl: Acl) -> StoreResult<()>;

    /// Block until a point lookup on `key` succeeds.
    ///
    /// Polls [`head_object`](Self::head_object) following `policy`; any error
    /// other than not-found aborts the wait.
    async fn wait_until_object_exists(
        &self,
        bucket: &str,
        key: &str,
        policy: &WaitPolicy,
    ) -> StoreResult<()> {
        let attempts = policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            match self.head_object(bucket, key).await {
                Ok(_) => return Ok(()),
                Err(e) if e.is_not_found() => {
                    tracing::trace!(bucket, key, attempt, "object not visible yet");
                    if attempt < attempts {
                        sleep(policy.backoff(attempt)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(StoreError::NotReady {
            bucket: bucket.to_string(),
            key: key.to_string(),
            attempts,
        })
    }
}
