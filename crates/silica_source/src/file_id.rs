//! Opaque identifiers for source files.

use serde::{Deserialize, Serialize};

/// An opaque, copyable identifier for a registered source file.
///
/// Created by [`SourceDb::add_file`](crate::SourceDb::add_file) and
/// resolved back to a file name through the same database.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// A sentinel file ID used when no source location is available.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
