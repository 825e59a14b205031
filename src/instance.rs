//! The problem-level API.
//!
//! An [`Instance`] is a validated CNF problem: a variable count and a list
//! of clauses over signed integers. `check` runs the CDCL solver and caches
//! the answer; after a `Sat` answer the model is available and provably
//! satisfies every input clause (`verify` re-checks it).

use crate::error::Error;
use crate::formula::Formula;
use crate::literal::PackedLiteral;
use crate::solver::{Solver, Stats, Status};

#[derive(Debug, Clone)]
pub struct Instance {
    num_vars: usize,
    clauses: Vec<Vec<i32>>,
    status: Status,
    model: Option<Vec<bool>>,
    stats: Stats,
}

impl Instance {
    /// Validates and wraps a problem. Every literal must be nonzero with
    /// `|literal| <= num_vars`.
    ///
    /// # Errors
    ///
    /// [`Error::LiteralOutOfRange`] on the first malformed literal.
    pub fn new(num_vars: usize, clauses: Vec<Vec<i32>>) -> Result<Self, Error> {
        for clause in &clauses {
            for &literal in clause {
                if literal == 0 || literal.unsigned_abs() as usize > num_vars {
                    return Err(Error::LiteralOutOfRange { literal, num_vars });
                }
            }
        }
        Ok(Self {
            num_vars,
            clauses,
            status: Status::Unknown,
            model: None,
            stats: Stats::default(),
        })
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    #[must_use]
    pub fn clauses(&self) -> &[Vec<i32>] {
        &self.clauses
    }

    /// Decides the instance. The first call runs the solver; later calls
    /// return the cached status.
    pub fn check(&mut self) -> Status {
        if self.status != Status::Unknown {
            return self.status;
        }
        let formula: Formula<PackedLiteral> =
            Formula::new(self.num_vars, self.clauses.iter().cloned());
        let mut solver: Solver = Solver::new(formula);
        let status = solver.check();
        if status == Status::Sat {
            let model = solver.model();
            debug_assert!(self.verify(&model), "solver produced an invalid model");
            self.model = Some(model);
        }
        self.stats = solver.stats();
        self.status = status;
        status
    }

    /// The satisfying assignment, available after a `Sat` answer. Length is
    /// `num_vars + 1`; index 0 is a filler and always false.
    #[must_use]
    pub fn model(&self) -> Option<&[bool]> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Does `model` satisfy every clause of the instance?
    #[must_use]
    pub fn verify(&self, model: &[bool]) -> bool {
        model.len() == self.num_vars + 1
            && self.clauses.iter().all(|clause| {
                clause
                    .iter()
                    .any(|&lit| model[lit.unsigned_abs() as usize] == (lit > 0))
            })
    }
}
