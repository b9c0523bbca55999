//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Warning`) to most severe (`Internal`),
/// matching the derived `PartialOrd`/`Ord` based on declaration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// A potential issue that does not prevent elaboration.
    Warning,
    /// A recognized but deliberately unimplemented construct.
    Sorry,
    /// A definite problem in the user's design.
    Error,
    /// A bug in the compiler itself (an unreachable state was reached).
    Internal,
}

impl Severity {
    /// Returns `true` for the severities counted toward the design error
    /// total: `Error`, `Sorry`, and `Internal`.
    pub fn counts_as_error(self) -> bool {
        matches!(self, Severity::Error | Severity::Sorry | Severity::Internal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Sorry => write!(f, "sorry"),
            Severity::Error => write!(f, "error"),
            Severity::Internal => write!(f, "internal error"),
        }
    }
}
