//! Shared foundational types for the Silica Verilog compiler.
//!
//! This crate provides interned identifiers, 4-state logic values, packed
//! logic vectors with the constant arithmetic used by elaboration, content
//! hashing, and common result types.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod logic;
pub mod logic_vec;
pub mod result;

pub use hash::{ContentHash, ContentHasher};
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use result::{InternalError, SilicaResult};
