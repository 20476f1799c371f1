//! Filesystem operations split into focused modules.

mod attrs;
mod create;
mod open;
mod remove;
mod rename;
mod stat;

pub use attrs::acl_for_mode;
