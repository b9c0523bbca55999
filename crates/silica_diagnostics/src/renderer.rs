//! Diagnostic rendering.

use crate::diagnostic::Diagnostic;
use silica_source::SourceDb;

/// Renders diagnostics as `file:line: severity: message` lines.
///
/// This is the classic compiler one-line format; each note is appended on
/// its own `note:`-prefixed line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineRenderer;

impl LineRenderer {
    /// Creates a new line renderer.
    pub fn new() -> Self {
        Self
    }

    /// Renders a single diagnostic into a formatted string.
    pub fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();
        if diag.span.is_dummy() {
            out.push_str(&format!("{}: {}\n", diag.severity, diag.message));
        } else {
            out.push_str(&format!(
                "{}: {}: {}\n",
                source_db.locate(diag.span),
                diag.severity,
                diag.message
            ));
        }
        for note in &diag.notes {
            out.push_str(&format!("note: {note}\n"));
        }
        out
    }
}
