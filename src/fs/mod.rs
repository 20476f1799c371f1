//! Filesystem facade over an object store.

mod file;
mod filesystem;
mod flags;
pub mod info;
mod operations;
pub(crate) mod path;
mod props;

pub use file::File;
pub use filesystem::Fs;
pub use flags::OpenFlags;
pub use info::FileInfo;
pub use operations::acl_for_mode;
pub use path::sanitize;
pub use props::UploadedFileProperties;
