//! Three-valued variable assignments.
//!
//! Every variable is `Unknown` until the search assigns it. Literal
//! evaluation composes the variable's value with the literal's polarity:
//! a negative literal is true exactly when its variable is assigned false.

use crate::literal::{Literal, Variable};

/// Assignment state of a single variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VarState {
    #[default]
    Unknown,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Assigned(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

/// Dense per-variable assignment map. Slot 0 is the reserved sentinel and
/// stays `Unknown` forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    states: Vec<VarState>,
}

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            states: vec![VarState::Unknown; num_vars + 1],
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.states.len() - 1
    }

    #[must_use]
    pub fn value_of(&self, var: Variable) -> Option<bool> {
        self.states[var as usize].as_bool()
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self.states[var as usize].is_assigned()
    }

    /// Evaluates a literal: `Some(true)` satisfied, `Some(false)` falsified,
    /// `None` while the variable is unassigned.
    #[must_use]
    pub fn literal_value<L: Literal>(&self, lit: L) -> Option<bool> {
        self.value_of(lit.variable())
            .map(|value| value != lit.is_negative())
    }

    /// Makes `lit` true.
    pub fn assign<L: Literal>(&mut self, lit: L) {
        debug_assert!(lit.variable() > 0, "variable 0 is reserved");
        self.states[lit.variable() as usize] = VarState::Assigned(lit.is_positive());
    }

    pub fn unassign(&mut self, var: Variable) {
        self.states[var as usize] = VarState::Unknown;
    }

    #[must_use]
    pub fn all_assigned(&self) -> bool {
        self.states[1..].iter().all(|state| state.is_assigned())
    }

    /// Extracts the model: a vector of length `N + 1` whose index 0 is a
    /// filler. Unassigned variables default to false.
    #[must_use]
    pub fn model(&self) -> Vec<bool> {
        self.states
            .iter()
            .map(|state| state.as_bool().unwrap_or(false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::PackedLiteral;

    fn lit(value: i32) -> PackedLiteral {
        PackedLiteral::from_dimacs(value)
    }

    #[test]
    fn assign_and_evaluate() {
        let mut a = Assignment::new(3);
        assert_eq!(a.value_of(1), None);
        assert!(!a.all_assigned());

        a.assign(lit(1));
        a.assign(lit(-2));

        assert_eq!(a.value_of(1), Some(true));
        assert_eq!(a.value_of(2), Some(false));
        assert_eq!(a.literal_value(lit(1)), Some(true));
        assert_eq!(a.literal_value(lit(-1)), Some(false));
        assert_eq!(a.literal_value(lit(-2)), Some(true));
        assert_eq!(a.literal_value(lit(2)), Some(false));
        assert_eq!(a.literal_value(lit(3)), None);

        a.assign(lit(3));
        assert!(a.all_assigned());

        a.unassign(3);
        assert_eq!(a.value_of(3), None);
        assert!(!a.all_assigned());
    }

    #[test]
    fn model_shape() {
        let mut a = Assignment::new(3);
        a.assign(lit(1));
        a.assign(lit(-3));
        let model = a.model();
        assert_eq!(model.len(), 4);
        assert!(!model[0]);
        assert!(model[1]);
        assert!(!model[2]); // unassigned defaults to false
        assert!(!model[3]);
    }

    #[test]
    fn zero_variables() {
        let a = Assignment::new(0);
        assert!(a.all_assigned());
        assert_eq!(a.model(), vec![false]);
    }
}
