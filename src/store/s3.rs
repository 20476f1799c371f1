//! Amazon S3 backend built on `aws-sdk-s3`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime};
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{
    Acl, ListOutput, ListRequest, ObjectHead, ObjectStore, ObjectSummary, PutObjectRequest,
    StoreError, StoreResult, UploadRequest,
};

/// S3 client configuration.
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// AWS region (falls back to the environment's default)
    pub region: Option<String>,
    /// Custom endpoint URL, e.g. MinIO or localstack
    pub endpoint: Option<String>,
    /// Force path-style addressing (required by some S3-compatible services)
    pub force_path_style: bool,
}

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Wrap an existing SDK client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the environment's credential chain.
    pub async fn from_config(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn canned(acl: Acl) -> ObjectCannedAcl {
    ObjectCannedAcl::from(acl.as_str())
}

fn system_time(dt: Option<&DateTime>) -> SystemTime {
    match dt {
        Some(dt) if dt.secs() >= 0 => {
            UNIX_EPOCH + Duration::new(dt.secs() as u64, dt.subsec_nanos())
        }
        _ => UNIX_EPOCH,
    }
}

/// Map an SDK failure onto the store taxonomy.
fn map_err<E>(err: SdkError<E, HttpResponse>, bucket: &str, key: &str) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if let SdkError::ServiceError(ctx) = &err {
        let service = ctx.err();
        // HEAD responses carry no body, so only the status identifies a miss.
        if ctx.raw().status().as_u16() == 404 {
            return StoreError::not_found(bucket, key);
        }
        return match service.code() {
            Some("NoSuchKey") | Some("NotFound") => StoreError::not_found(bucket, key),
            Some("InvalidRange") => StoreError::InvalidRange {
                bucket: bucket.to_string(),
                key: key.to_string(),
                offset: 0,
            },
            code => StoreError::Service {
                code: code.unwrap_or("Unknown").to_string(),
                message: service.message().unwrap_or_default().to_string(),
            },
        };
    }
    StoreError::Other(Box::new(err))
}

#[async_trait]
impl ObjectStore for S3Store {
    #[tracing::instrument(level = "trace", skip(self, req), fields(bucket = %req.bucket, key = %req.key))]
    async fn put_object(&self, req: PutObjectRequest) -> StoreResult<()> {
        self.client
            .put_object()
            .bucket(&req.bucket)
            .key(&req.key)
            .body(ByteStream::from(req.body))
            .set_acl(req.acl.map(canned))
            .set_cache_control(req.cache_control)
            .set_content_type(req.content_type)
            .set_content_encoding(req.content_encoding)
            .send()
            .await
            .map_err(|e| map_err(e, &req.bucket, &req.key))?;
        Ok(())
    }

    /// Sent as a single PUT, so S3 rejects bodies over 5 GiB.
    #[tracing::instrument(level = "trace", skip(self, req), fields(bucket = %req.bucket, key = %req.key, size = req.body.len()))]
    async fn upload(&self, req: UploadRequest) -> StoreResult<()> {
        self.client
            .put_object()
            .bucket(&req.bucket)
            .key(&req.key)
            .body(ByteStream::from(req.body))
            .set_acl(req.acl.map(canned))
            .set_cache_control(req.cache_control)
            .set_content_type(req.content_type)
            .set_content_encoding(req.content_encoding)
            .send()
            .await
            .map_err(|e| map_err(e, &req.bucket, &req.key))?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectHead> {
        let out = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_err(e, bucket, key))?;

        Ok(ObjectHead {
            size: out.content_length().unwrap_or(0).max(0) as u64,
            last_modified: system_time(out.last_modified()),
            content_type: out.content_type().map(str::to_string),
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
        if len == 0 {
            return Ok(Bytes::new());
        }
        let end = offset.saturating_add(len) - 1;
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .range(format!("bytes={offset}-{end}"))
            .send()
            .await
            .map_err(|e| match map_err(e, bucket, key) {
                StoreError::InvalidRange { bucket, key, .. } => StoreError::InvalidRange {
                    bucket,
                    key,
                    offset,
                },
                other => other,
            })?;

        let data = out
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Other(Box::new(e)))?;
        Ok(data.into_bytes())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_err(e, bucket, key))?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self, req), fields(bucket = %req.bucket, prefix = %req.prefix))]
    async fn list_objects(&self, req: ListRequest) -> StoreResult<ListOutput> {
        let max_keys = if req.max_keys == 0 { 1000 } else { req.max_keys };
        let out = self
            .client
            .list_objects_v2()
            .bucket(&req.bucket)
            .prefix(&req.prefix)
            .set_delimiter(req.delimiter.clone())
            .max_keys(max_keys.min(i32::MAX as usize) as i32)
            .set_continuation_token(req.continuation_token.clone())
            .send()
            .await
            .map_err(|e| map_err(e, &req.bucket, &req.prefix))?;

        let objects = out
            .contents()
            .iter()
            .filter_map(|o| {
                Some(ObjectSummary {
                    key: o.key()?.to_string(),
                    size: o.size().unwrap_or(0).max(0) as u64,
                    last_modified: system_time(o.last_modified()),
                })
            })
            .collect::<Vec<_>>();
        let common_prefixes = out
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect::<Vec<_>>();

        let key_count = out
            .key_count()
            .map(|n| n.max(0) as usize)
            .unwrap_or(objects.len() + common_prefixes.len());

        Ok(ListOutput {
            objects,
            common_prefixes,
            key_count,
            is_truncated: out.is_truncated().unwrap_or(false),
            next_continuation_token: out.next_continuation_token().map(str::to_string),
        })
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn copy_object(&self, bucket: &str, source_key: &str, dest_key: &str) -> StoreResult<()> {
        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(format!("{bucket}/{source_key}"))
            .key(dest_key)
            .send()
            .await
            .map_err(|e| map_err(e, bucket, source_key))?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn put_object_acl(&self, bucket: &str, key: &str, acl: Acl) -> StoreResult<()> {
        self.client
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(canned(acl))
            .send()
            .await
            .map_err(|e| map_err(e, bucket, key))?;
        Ok(())
    }
}
