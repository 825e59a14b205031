//! A plain DPLL solver: chronological backtracking plus full-scan unit
//! propagation, no learning, no watches.
//!
//! Slow but simple enough to trust, which is exactly what the differential
//! tests need as an oracle for the CDCL solver. Also selectable from the CLI.

use crate::assignment::Assignment;
use crate::formula::Formula;
use crate::literal::{Literal, PackedLiteral, Variable};
use crate::solver::{Stats, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Branch point; `flipped` once both polarities were tried.
    Decision { flipped: bool },
    Implied,
}

#[derive(Debug, Clone)]
pub struct Dpll<L: Literal = PackedLiteral> {
    formula: Formula<L>,
    assignment: Assignment,
    trail: Vec<(L, Step)>,
    stats: Stats,
}

/// One full pass over the clause set.
enum Scan<L> {
    Conflict,
    Unit(L),
    Quiet,
}

impl<L: Literal> Dpll<L> {
    #[must_use]
    pub fn new(formula: Formula<L>) -> Self {
        let num_vars = formula.num_vars();
        Self {
            formula,
            assignment: Assignment::new(num_vars),
            trail: Vec::with_capacity(num_vars),
            stats: Stats::default(),
        }
    }

    pub fn check(&mut self) -> Status {
        if self.formula.iter().any(crate::clause::Clause::is_empty) {
            return Status::Unsat;
        }

        loop {
            match self.scan() {
                Scan::Conflict => {
                    self.stats.conflicts += 1;
                    if !self.backtrack() {
                        return Status::Unsat;
                    }
                }
                Scan::Unit(lit) => {
                    self.stats.propagations += 1;
                    self.assignment.assign(lit);
                    self.trail.push((lit, Step::Implied));
                }
                Scan::Quiet => {
                    let Some(var) = self.first_unassigned() else {
                        return Status::Sat;
                    };
                    self.stats.decisions += 1;
                    let lit = L::new(var, false);
                    self.assignment.assign(lit);
                    self.trail.push((lit, Step::Decision { flipped: false }));
                }
            }
        }
    }

    /// The model found by a Sat run; same shape as the CDCL solver's.
    #[must_use]
    pub fn model(&self) -> Vec<bool> {
        self.assignment.model()
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    fn first_unassigned(&self) -> Option<Variable> {
        #[allow(clippy::cast_possible_truncation)]
        let last = self.formula.num_vars() as Variable;
        (1..=last).find(|&var| !self.assignment.is_assigned(var))
    }

    fn scan(&self) -> Scan<L> {
        let mut unit = None;
        for clause in self.formula.iter() {
            let mut unassigned = None;
            let mut free = 0;
            let mut satisfied = false;
            for &lit in clause.iter() {
                match self.assignment.literal_value(lit) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        free += 1;
                        unassigned = Some(lit);
                    }
                }
            }
            if satisfied {
                continue;
            }
            match free {
                0 => return Scan::Conflict,
                1 if unit.is_none() => unit = unassigned,
                _ => {}
            }
        }
        unit.map_or(Scan::Quiet, Scan::Unit)
    }

    /// Unwinds to the deepest unflipped decision and tries its negation.
    /// False when no branch is left, i.e. the search space is exhausted.
    fn backtrack(&mut self) -> bool {
        while let Some((lit, step)) = self.trail.pop() {
            self.assignment.unassign(lit.variable());
            if let Step::Decision { flipped: false } = step {
                let flipped = lit.negated();
                self.assignment.assign(flipped);
                self.trail.push((flipped, Step::Decision { flipped: true }));
                return true;
            }
        }
        false
    }
}
