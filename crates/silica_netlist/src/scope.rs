//! Scopes in the hierarchical name tree of an elaborated design.

use crate::ids::ScopeId;
use serde::{Deserialize, Serialize};
use silica_common::Ident;

/// The kind of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// The root scope of the design, named after the root module.
    Root,
    /// A module instance.
    Module,
    /// A named `begin/end` block.
    BeginEnd,
    /// A named `fork/join` block.
    ForkJoin,
    /// A function body.
    Function,
    /// A task body.
    Task,
}

/// A node in the hierarchical scope tree.
///
/// Every named entity in the design has a fully qualified dot-separated
/// path rooted in some scope. Scope paths are unique across the design;
/// attempting to create a duplicate is an error reported at the point of
/// instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetScope {
    /// The parent scope, or `None` for the root.
    pub parent: Option<ScopeId>,
    /// The kind of this scope.
    pub kind: ScopeKind,
    /// The leaf name (last path component).
    pub name: Ident,
    /// The fully qualified dot-separated path.
    pub path: Ident,
}
