//! Source locations for parse nodes and diagnostics.
//!
//! Every parse-tree node carries a [`Span`] naming its originating file and
//! line. The [`SourceDb`] maps [`FileId`]s back to file names so diagnostics
//! can be rendered as `file:line: severity: message`.

#![warn(missing_docs)]

pub mod file_id;
pub mod source_db;
pub mod span;

pub use file_id::FileId;
pub use source_db::SourceDb;
pub use span::Span;
