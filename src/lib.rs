//! # bucketfs
//!
//! Filesystem semantics on top of an S3-style object store.
//!
//! ## Features
//!
//! - **Paths**: Windows-style and unclean paths are normalized before they
//!   become object keys (`sanitize`).
//! - **Directories**: synthesized from key prefixes and zero-byte `dir/`
//!   markers; `stat` falls back to a prefix listing when no object exists.
//! - **Files**:
//!   - Write handles buffer data and upload it on `close`.
//!   - Read handles fetch ranges lazily and support `seek`.
//!   - `create` waits until the new object is visible to point lookups.
//! - **Upload properties**: ACL, cache control, content type and encoding
//!   applied to every object the filesystem writes.
//! - **Backends**: an in-memory store for tests and an AWS S3 store behind
//!   the `s3` feature.
//!
//! Operations with no object-store equivalent (`chown`, `chtimes`,
//! read-write or append opens, positional writes) fail with
//! [`FsError::NotSupported`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bucketfs::{Fs, MemoryStore, UploadedFileProperties, Acl};
//!
//! # #[tokio::main]
//! # async fn main() -> bucketfs::Result<()> {
//! let fs = Fs::new("assets", Arc::new(MemoryStore::new()))
//!     .with_file_props(UploadedFileProperties::default().with_acl(Acl::PublicRead));
//!
//! fs.mkdir("/reports", 0o755).await?;
//! let mut file = fs.create("/reports/q1.csv").await?;
//! file.write_str("region,total\n")?;
//! file.close().await?;
//!
//! let mut dir = fs.open("/reports").await?;
//! for entry in dir.readdir(0).await? {
//!     println!("{} ({} bytes)", entry.name(), entry.size());
//! }
//!
//! fs.rename("/reports/q1.csv", "/reports/2024-q1.csv").await?;
//! fs.remove_all("/reports").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod store;

// Re-export commonly used types
pub use config::FsConfig;
pub use error::{FsError, Result};
pub use fs::{acl_for_mode, sanitize, File, FileInfo, Fs, OpenFlags, UploadedFileProperties};
pub use store::{Acl, MemoryStore, ObjectStore, StoreError, WaitPolicy};
#[cfg(feature = "s3")]
pub use store::{S3Config, S3Store};
