//! Interned identifiers for cheap cloning and O(1) equality comparison.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A unique identifier for any named entity in the compiler.
///
/// Identifiers are interned strings represented as a `u32` index into a
/// shared string interner. Both leaf names (`clk`) and fully qualified
/// hierarchical paths (`top.u1.clk`) are interned, so building and
/// comparing netlist paths is O(1) after the first occurrence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// This is primarily intended for deserialization and testing.
    /// In normal use, identifiers should be created through
    /// [`Interner::get_or_intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit
// and 64-bit platforms. `try_from_usize` rejects values that don't fit in
// `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// All module names, signal names, and hierarchical scope paths are
/// interned here. Interning only needs `&self`, so a single interner can
/// be shared by the parser, the elaborator, and the back-ends.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`Ident`]. If the string was already
    /// interned, returns the existing identifier without allocating.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Interns the hierarchical path `base.leaf`.
    ///
    /// This is the canonical way netlist names are formed: a scope path
    /// joined to a member name with a dot.
    pub fn join(&self, base: Ident, leaf: &str) -> Ident {
        let joined = format!("{}.{}", self.resolve(base), leaf);
        self.rodeo.get_or_intern(&joined)
    }

    /// Returns the parent path of a dot-separated hierarchical name, or
    /// `None` for a single-component name.
    pub fn parent(&self, path: Ident) -> Option<Ident> {
        let s = self.resolve(path);
        let idx = s.rfind('.')?;
        let parent = s[..idx].to_string();
        Some(self.rodeo.get_or_intern(&parent))
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("clk");
        assert_eq!(interner.resolve(id), "clk");
    }

    #[test]
    fn same_string_same_ident() {
        let interner = Interner::new();
        let a = interner.get_or_intern("top");
        let b = interner.get_or_intern("top");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_different_idents() {
        let interner = Interner::new();
        let a = interner.get_or_intern("foo");
        let b = interner.get_or_intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn join_builds_dotted_path() {
        let interner = Interner::new();
        let top = interner.get_or_intern("top");
        let path = interner.join(top, "u1");
        assert_eq!(interner.resolve(path), "top.u1");
        let deep = interner.join(path, "clk");
        assert_eq!(interner.resolve(deep), "top.u1.clk");
    }

    #[test]
    fn join_is_deduplicated() {
        let interner = Interner::new();
        let top = interner.get_or_intern("top");
        let a = interner.join(top, "u1");
        let b = interner.get_or_intern("top.u1");
        assert_eq!(a, b);
    }

    #[test]
    fn parent_of_path() {
        let interner = Interner::new();
        let p = interner.get_or_intern("top.u1.clk");
        let parent = interner.parent(p).unwrap();
        assert_eq!(interner.resolve(parent), "top.u1");
        let root = interner.get_or_intern("top");
        assert_eq!(interner.parent(root), None);
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
