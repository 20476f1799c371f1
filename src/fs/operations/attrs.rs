//! Attribute changes.

use std::time::SystemTime;

use crate::error::{FsError, Result};
use crate::fs::path::key_of;
use crate::fs::Fs;
use crate::store::Acl;

/// Canned ACL for a POSIX mode. Only the "other" read and write bits count.
pub fn acl_for_mode(mode: u32) -> Acl {
    let other_read = mode & 0o004 != 0;
    let other_write = mode & 0o002 != 0;
    match (other_read, other_write) {
        (true, true) => Acl::PublicReadWrite,
        (true, false) => Acl::PublicRead,
        (false, _) => Acl::Private,
    }
}

impl Fs {
    /// Set the object's canned ACL from `mode`; see [`acl_for_mode`].
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn chmod(&self, name: &str, mode: u32) -> Result<()> {
        let name = self.sanitize(name);
        let acl = acl_for_mode(mode);
        tracing::debug!(acl = %acl, "set object acl");

        self.store
            .put_object_acl(&self.bucket, key_of(&name), acl)
            .await
            .map_err(|e| FsError::store("chmod", name, e))
    }

    /// Objects have no owner to change.
    pub async fn chown(&self, name: &str, _uid: u32, _gid: u32) -> Result<()> {
        Err(FsError::not_supported("chown", self.sanitize(name)))
    }

    /// Object timestamps are set by the store.
    pub async fn chtimes(&self, name: &str, _atime: SystemTime, _mtime: SystemTime) -> Result<()> {
        Err(FsError::not_supported("chtimes", self.sanitize(name)))
    }
}
