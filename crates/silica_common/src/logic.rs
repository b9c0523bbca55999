//! Verilog 4-state logic values with truth-table-based operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single Verilog 4-state logic value.
///
/// The four states represent:
/// - `Zero` — logic low (driven 0)
/// - `One` — logic high (driven 1)
/// - `X` — unknown or uninitialized value
/// - `Z` — high-impedance (tri-state, not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance (tri-state).
    Z = 3,
}

impl Logic {
    /// Converts a character to a [`Logic`] value.
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Returns the lowercase display character for this value.
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }

    /// Returns `true` for `X` and `Z`, the two undriven/unknown states.
    pub fn is_xz(self) -> bool {
        matches!(self, Logic::X | Logic::Z)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Verilog AND truth table: 0 dominates, 1&1 = 1, anything else is x.
impl BitAnd for Logic {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, _) | (_, Zero) => Zero,
            (One, One) => One,
            _ => X,
        }
    }
}

/// Verilog OR truth table: 1 dominates, 0|0 = 0, anything else is x.
impl BitOr for Logic {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (One, _) | (_, One) => One,
            (Zero, Zero) => Zero,
            _ => X,
        }
    }
}

/// Verilog XOR truth table: defined for driven operands, x otherwise.
impl BitXor for Logic {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use Logic::*;
        match (self, rhs) {
            (Zero, Zero) | (One, One) => Zero,
            (Zero, One) | (One, Zero) => One,
            _ => X,
        }
    }
}

/// Verilog NOT: `!0 = 1`, `!1 = 0`, `!x = x`, `!z = x`.
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        use Logic::*;
        match self {
            Zero => One,
            One => Zero,
            X | Z => X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Logic::*;

    #[test]
    fn and_truth_table() {
        assert_eq!(Zero & Zero, Zero);
        assert_eq!(Zero & One, Zero);
        assert_eq!(Zero & X, Zero);
        assert_eq!(Zero & Z, Zero);
        assert_eq!(One & One, One);
        assert_eq!(One & X, X);
        assert_eq!(One & Z, X);
        assert_eq!(X & Z, X);
        assert_eq!(Z & Z, X);
    }

    #[test]
    fn or_truth_table() {
        assert_eq!(One | Zero, One);
        assert_eq!(One | X, One);
        assert_eq!(One | Z, One);
        assert_eq!(Zero | Zero, Zero);
        assert_eq!(Zero | X, X);
        assert_eq!(Zero | Z, X);
        assert_eq!(X | Z, X);
    }

    #[test]
    fn xor_truth_table() {
        assert_eq!(Zero ^ Zero, Zero);
        assert_eq!(Zero ^ One, One);
        assert_eq!(One ^ One, Zero);
        assert_eq!(One ^ X, X);
        assert_eq!(Z ^ Zero, X);
    }

    #[test]
    fn not_values() {
        assert_eq!(!Zero, One);
        assert_eq!(!One, Zero);
        assert_eq!(!X, X);
        assert_eq!(!Z, X);
    }

    #[test]
    fn char_roundtrip() {
        use super::Logic;
        for v in [Zero, One, X, Z] {
            assert_eq!(Logic::from_char(v.to_char()), Some(v));
        }
        assert_eq!(Logic::from_char('X'), Some(X));
        assert_eq!(Logic::from_char('Z'), Some(Z));
        assert_eq!(Logic::from_char('a'), None);
    }

    #[test]
    fn is_xz() {
        assert!(!Zero.is_xz());
        assert!(!One.is_xz());
        assert!(X.is_xz());
        assert!(Z.is_xz());
    }
}
