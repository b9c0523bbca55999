//! Registry of source file names.

use crate::file_id::FileId;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Maps [`FileId`]s to the file names they were registered under.
///
/// The database stores names only; file contents belong to the parser and
/// never reach elaboration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDb {
    files: Vec<String>,
}

impl SourceDb {
    /// Creates a new empty source database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file name and returns its [`FileId`].
    pub fn add_file(&mut self, name: impl Into<String>) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(name.into());
        id
    }

    /// Returns the name of a registered file, or `"<unknown>"` for the
    /// dummy file ID.
    pub fn file_name(&self, id: FileId) -> &str {
        self.files
            .get(id.as_raw() as usize)
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    /// Formats a span as `file:line` for diagnostic prefixes.
    pub fn locate(&self, span: Span) -> String {
        format!("{}:{}", self.file_name(span.file), span.line)
    }

    /// Returns the number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files are registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
