//! Renaming.

use crate::error::{FsError, Result};
use crate::fs::path::key_of;
use crate::fs::Fs;

impl Fs {
    /// Move `old_name` to `new_name` by copying and then deleting the source.
    ///
    /// The two steps are separate store calls. Between them both keys exist,
    /// and if the delete fails the copy stays in place and the error names
    /// the source path. Renaming a path onto itself makes no store calls.
    /// Only the object at the exact key moves: for a directory that is its
    /// marker, not its entries.
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_name = self.sanitize(old_name);
        let new_name = self.sanitize(new_name);
        if old_name == new_name {
            return Ok(());
        }

        self.store
            .copy_object(&self.bucket, key_of(&old_name), key_of(&new_name))
            .await
            .map_err(|e| FsError::store("rename", old_name.as_str(), e))?;

        if let Err(e) = self.store.delete_object(&self.bucket, key_of(&old_name)).await {
            tracing::warn!(
                from = %old_name,
                to = %new_name,
                "copied but could not delete source; both keys remain"
            );
            return Err(FsError::store("rename", old_name, e));
        }
        Ok(())
    }
}
