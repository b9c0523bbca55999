//! Mutable elaboration state threaded through every elaboration function.
//!
//! [`ElabCtx`] replaces the process-wide module/primitive lookup tables
//! of classic elaborators with an explicit context: the design under
//! construction, the parse-tree lookup tables, the interner, and the
//! diagnostic sink.

use std::collections::HashMap;

use silica_common::{Ident, Interner};
use silica_diagnostics::{Diagnostic, DiagnosticSink};
use silica_netlist::Design;
use silica_pform::{Module, PUdp};

/// Mutable state carried through recursive elaboration.
pub struct ElabCtx<'a> {
    /// The design being built.
    pub design: Design,
    /// All parsed modules by name.
    pub modules: &'a HashMap<Ident, Module>,
    /// All parsed primitives by name.
    pub primitives: &'a HashMap<Ident, PUdp>,
    /// The string interner shared with the parser.
    pub interner: &'a Interner,
    /// The diagnostic sink.
    pub sink: &'a DiagnosticSink,
}

impl ElabCtx<'_> {
    /// Emits a diagnostic, bumping [`Design::errors`] for severities that
    /// count as errors.
    pub fn emit(&mut self, diag: Diagnostic) {
        if diag.severity.counts_as_error() {
            self.design.errors += 1;
        }
        self.sink.emit(diag);
    }

    /// Resolves an identifier to its string.
    pub fn name(&self, id: Ident) -> &str {
        self.interner.resolve(id)
    }
}
