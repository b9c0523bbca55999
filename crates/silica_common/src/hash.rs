//! Content hashing for structural design comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit content hash computed using XXH3.
///
/// Used to compare elaborated designs structurally: two designs with the
/// same `ContentHash` are assumed to be identical netlists. Name-bearing
/// entities are hashed through their resolved strings, so hashes are
/// stable across interner instances.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// An incremental XXH3-128 hasher for digesting structures piecewise.
///
/// Callers feed strings and integers in a canonical traversal order and
/// take the final [`ContentHash`]. Each `write_*` method hashes a length
/// or discriminant prefix so that adjacent fields cannot alias.
#[derive(Default)]
pub struct ContentHasher {
    inner: Xxh3,
}

impl ContentHasher {
    /// Creates a new empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a string, prefixed with its length.
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.inner.update(s.as_bytes());
    }

    /// Feeds a `u64` in little-endian order.
    pub fn write_u64(&mut self, v: u64) {
        self.inner.update(&v.to_le_bytes());
    }

    /// Feeds an `i64` in little-endian order.
    pub fn write_i64(&mut self, v: i64) {
        self.inner.update(&v.to_le_bytes());
    }

    /// Feeds a small discriminant tag.
    pub fn write_tag(&mut self, tag: u8) {
        self.inner.update(&[tag]);
    }

    /// Finishes the digest and returns the accumulated hash.
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.inner.digest128().to_le_bytes())
    }
}
