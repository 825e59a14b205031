//! Decision heuristics: which variable to branch on, and with which polarity.

use crate::assignment::Assignment;
use crate::formula::Formula;
use crate::literal::{Literal, Variable};

/// Variable selection order for the search driver.
///
/// `pick` must return an unassigned variable whenever one exists; ties are
/// broken towards the lowest index so the search stays deterministic.
pub trait VariableOrder {
    fn new<L: Literal>(formula: &Formula<L>) -> Self;

    fn pick(&self, assignment: &Assignment) -> Option<Variable>;

    fn bump(&mut self, var: Variable);

    fn decay(&mut self);
}

const DECAY: f64 = 0.95;
const RESCALE_LIMIT: f64 = 1e100;
const RESCALE_FACTOR: f64 = 1e-100;

/// Exponentially decaying variable activities (VSIDS).
///
/// Decay is expressed by growing the bump increment instead of sweeping
/// every score; when any score overflows the limit, the whole table and the
/// increment are rescaled together, which preserves the ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Vsids {
    activities: Vec<f64>,
    increment: f64,
}

impl Vsids {
    fn rescale(&mut self) {
        for activity in &mut self.activities {
            *activity *= RESCALE_FACTOR;
        }
        self.increment *= RESCALE_FACTOR;
    }

    #[must_use]
    pub fn activity(&self, var: Variable) -> f64 {
        self.activities[var as usize]
    }
}

impl VariableOrder for Vsids {
    /// Seeds every variable's score with its occurrence count, so the first
    /// decisions fall on frequently constrained variables.
    fn new<L: Literal>(formula: &Formula<L>) -> Self {
        let mut order = Self {
            activities: vec![0.0; formula.num_vars() + 1],
            increment: 1.0,
        };
        for clause in formula.iter() {
            for &lit in clause.iter() {
                order.bump(lit.variable());
            }
        }
        order
    }

    fn pick(&self, assignment: &Assignment) -> Option<Variable> {
        let mut best: Option<(Variable, f64)> = None;
        for var in 1..self.activities.len() {
            #[allow(clippy::cast_possible_truncation)]
            let var = var as Variable;
            if assignment.is_assigned(var) {
                continue;
            }
            let activity = self.activities[var as usize];
            match best {
                Some((_, top)) if activity <= top => {}
                _ => best = Some((var, activity)),
            }
        }
        best.map(|(var, _)| var)
    }

    fn bump(&mut self, var: Variable) {
        self.activities[var as usize] += self.increment;
        if self.activities[var as usize] > RESCALE_LIMIT {
            self.rescale();
        }
    }

    fn decay(&mut self) {
        self.increment /= DECAY;
    }
}

/// Picks the lowest unassigned index. No activity bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AscendingOrder {
    num_vars: Variable,
}

impl VariableOrder for AscendingOrder {
    fn new<L: Literal>(formula: &Formula<L>) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let num_vars = formula.num_vars() as Variable;
        Self { num_vars }
    }

    fn pick(&self, assignment: &Assignment) -> Option<Variable> {
        (1..=self.num_vars).find(|&var| !assignment.is_assigned(var))
    }

    fn bump(&mut self, _: Variable) {}

    fn decay(&mut self) {}
}

/// Remembers the polarity each variable last held, so the search re-explores
/// familiar subspaces after backtracking. Unseen variables default to true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPhases(Vec<Option<bool>>);

impl SavedPhases {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![None; num_vars + 1])
    }

    pub fn save(&mut self, var: Variable, value: bool) {
        self.0[var as usize] = Some(value);
    }

    #[must_use]
    pub fn next(&self, var: Variable) -> bool {
        self.0[var as usize].unwrap_or(true)
    }
}
