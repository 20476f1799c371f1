//! Open flags.

use bitflags::bitflags;

bitflags! {
    /// Intended access when opening a path.
    ///
    /// An empty set means read-only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const WRITE_ONLY = 1 << 0;
        const READ_WRITE = 1 << 1;
        const APPEND = 1 << 2;
        const CREATE = 1 << 3;
        const TRUNCATE = 1 << 4;
        const EXCLUSIVE = 1 << 5;
    }
}

impl OpenFlags {
    pub const READ_ONLY: OpenFlags = OpenFlags::empty();

    /// Whether the flags ask for a write stream.
    pub fn is_write(&self) -> bool {
        self.intersects(OpenFlags::WRITE_ONLY | OpenFlags::CREATE)
    }
}
