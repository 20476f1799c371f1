//! Filesystem configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FsError, Result};
use crate::fs::UploadedFileProperties;
use crate::store::WaitPolicy;

/// Serializable configuration for an [`Fs`](crate::Fs) handle.
///
/// # Example
/// ```
/// use bucketfs::FsConfig;
///
/// let config = FsConfig::from_json(r#"{
///     "bucket": "assets",
///     "file_props": { "acl": "public-read", "cache_control": "max-age=3600" },
///     "wait": { "max_attempts": 10, "delay": 500 }
/// }"#).unwrap();
/// assert_eq!(config.bucket, "assets");
/// assert!(!config.raw_mode);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Bucket every path resolves against
    pub bucket: String,
    /// Skip path sanitation when true
    pub raw_mode: bool,
    /// Properties applied to every new object
    pub file_props: Option<UploadedFileProperties>,
    /// Readiness wait used by `create`
    pub wait: WaitPolicy,
}

impl FsConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(FsError::Config("bucket name cannot be empty".to_string()));
        }
        if self.wait.max_attempts == 0 {
            return Err(FsError::Config(
                "wait.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::Acl;

    #[test]
    fn test_from_json() {
        let config = FsConfig::from_json(
            r#"{"bucket":"b","raw_mode":true,"file_props":{"acl":"private"},"wait":{"max_attempts":3,"delay":10}}"#,
        )
        .unwrap();

        assert_eq!(config.bucket, "b");
        assert!(config.raw_mode);
        assert_eq!(config.file_props.unwrap().acl, Some(Acl::Private));
        assert_eq!(config.wait.max_attempts, 3);
        assert_eq!(config.wait.delay, Duration::from_millis(10));
    }

    #[test]
    fn test_validation() {
        let err = FsConfig::from_json(r#"{"raw_mode":false}"#).unwrap_err();
        assert!(matches!(err, FsError::Config(_)));

        let err = FsConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, FsError::Json(_)));

        let mut config = FsConfig::new("b");
        config.wait.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = FsConfig::new("assets");
        let json = config.to_json().unwrap();
        assert_eq!(FsConfig::from_json(&json).unwrap(), config);
    }
}
