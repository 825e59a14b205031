//! Literal representations.
//!
//! A literal is a variable paired with a polarity. Variables are numbered
//! `1..=N`; index 0 is reserved and never names a variable. Internally the
//! solver works with [`PackedLiteral`], which stores the literal as the small
//! unsigned code `2 * variable + sign` so that watch lists and other
//! per-literal tables can be indexed directly. [`DimacsLiteral`] keeps the
//! external signed-integer convention and exists mainly for interoperability
//! and tests.

use std::fmt::Debug;
use std::hash::Hash;

/// A propositional variable, numbered from 1. Zero is a reserved sentinel.
pub type Variable = u32;

/// Trait over concrete literal encodings.
///
/// Implementations must be cheap to copy and provide a stable total order;
/// the order is arbitrary and only used for deduplication.
pub trait Literal: Copy + Debug + Default + Eq + Hash + Ord {
    /// Builds the literal for `var` with the given polarity.
    /// `negative == false` produces the positive literal.
    fn new(var: Variable, negative: bool) -> Self;

    fn variable(self) -> Variable;

    fn is_negative(self) -> bool;

    #[must_use]
    fn negated(self) -> Self;

    fn is_positive(self) -> bool {
        !self.is_negative()
    }

    /// Dense index `2 * variable + sign`, used to address per-literal tables.
    fn code(self) -> usize {
        (self.variable() as usize) * 2 + usize::from(self.is_negative())
    }

    #[must_use]
    fn from_code(code: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let var = (code / 2) as Variable;
        Self::new(var, code % 2 != 0)
    }

    /// Converts from the DIMACS convention (`3` is `x3`, `-3` is `¬x3`).
    ///
    /// Zero is not a literal; callers are expected to have validated input.
    #[must_use]
    fn from_dimacs(value: i32) -> Self {
        debug_assert_ne!(value, 0, "zero is a clause terminator, not a literal");
        Self::new(value.unsigned_abs(), value < 0)
    }

    fn to_dimacs(self) -> i32 {
        #[allow(clippy::cast_possible_wrap)]
        let index = self.variable() as i32;
        if self.is_negative() {
            -index
        } else {
            index
        }
    }
}

/// Literal stored as the code `2 * variable + sign` in a `u32`.
///
/// Negation is a single xor and [`Literal::code`] is a no-op, which makes
/// this the representation the solver defaults to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackedLiteral(u32);

impl Literal for PackedLiteral {
    fn new(var: Variable, negative: bool) -> Self {
        Self(var * 2 + u32::from(negative))
    }

    fn variable(self) -> Variable {
        self.0 / 2
    }

    fn is_negative(self) -> bool {
        self.0 % 2 != 0
    }

    fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    fn code(self) -> usize {
        self.0 as usize
    }
}

/// Literal stored as a signed integer, matching the DIMACS convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DimacsLiteral(i32);

impl Literal for DimacsLiteral {
    fn new(var: Variable, negative: bool) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let index = var as i32;
        Self(if negative { -index } else { index })
    }

    fn variable(self) -> Variable {
        self.0.unsigned_abs()
    }

    fn is_negative(self) -> bool {
        self.0 < 0
    }

    fn negated(self) -> Self {
        Self(-self.0)
    }
}

/// Maps a literal from one encoding to another.
pub fn convert<T: Literal, U: Literal>(lit: T) -> U {
    U::new(lit.variable(), lit.is_negative())
}
