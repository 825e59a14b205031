//! The CDCL search driver.
//!
//! One loop: propagate; on conflict either report Unsat (level 0) or learn a
//! 1-UIP clause, backjump, and assert it; on a quiet propagation either
//! report Sat (everything assigned) or decide on a fresh variable. Restarts
//! drop the decision stack on a Luby schedule, and the learnt database is
//! reduced when it outgrows its budget. Level-0 simplification runs before
//! the first decision and after every restart.

use crate::assignment::Assignment;
use crate::clause::Clause;
use crate::conflict::Analyser;
use crate::decision::{SavedPhases, VariableOrder, Vsids};
use crate::formula::{ClauseRef, Formula};
use crate::literal::{Literal, PackedLiteral};
use crate::propagation::Propagator;
use crate::restart::{LubyRestarts, RestartPolicy};
use crate::simplify;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use tracing::{debug, trace};

/// Outcome of a `check` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Sat,
    Unsat,
    /// Reserved for interrupted runs; this solver always decides.
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat => write!(f, "Sat"),
            Self::Unsat => write!(f, "Unsat"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Search counters, all monotonically increasing over a solver's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub learnt_clauses: u64,
    pub restarts: u64,
    /// Clauses removed by level-0 simplification.
    pub simplified_clauses: u64,
    /// Learnt clauses removed by database reduction.
    pub reduced_clauses: u64,
    pub pure_literals: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "c decisions      {}", self.decisions)?;
        writeln!(f, "c propagations   {}", self.propagations)?;
        writeln!(f, "c conflicts      {}", self.conflicts)?;
        writeln!(f, "c learnt clauses {}", self.learnt_clauses)?;
        writeln!(f, "c restarts       {}", self.restarts)?;
        writeln!(f, "c simplified     {}", self.simplified_clauses)?;
        writeln!(f, "c reduced        {}", self.reduced_clauses)?;
        write!(f, "c pure literals  {}", self.pure_literals)
    }
}

const CLAUSE_DECAY: f64 = 0.999;
const CLAUSE_RESCALE_LIMIT: f64 = 1e20;
const CLAUSE_RESCALE_FACTOR: f64 = 1e-20;

#[derive(Debug, Clone)]
pub struct Solver<L: Literal = PackedLiteral, V: VariableOrder = Vsids, R: RestartPolicy = LubyRestarts>
{
    formula: Formula<L>,
    assignment: Assignment,
    trail: crate::trail::Trail<L>,
    propagator: Propagator<L>,
    analyser: Analyser,
    order: V,
    phases: SavedPhases,
    restarts: R,
    clause_increment: f64,
    pub(crate) max_learnts: usize,
    stats: Stats,
    /// Cleared once a top-level contradiction is established.
    ok: bool,
}

impl<L: Literal, V: VariableOrder, R: RestartPolicy> Solver<L, V, R> {
    #[must_use]
    pub fn new(formula: Formula<L>) -> Self {
        let num_vars = formula.num_vars();
        let order = V::new(&formula);
        let propagator = Propagator::new(&formula);
        let max_learnts = (formula.first_learnt() / 3).max(100);

        let mut solver = Self {
            assignment: Assignment::new(num_vars),
            trail: crate::trail::Trail::new(num_vars),
            propagator,
            analyser: Analyser::new(num_vars),
            order,
            phases: SavedPhases::new(num_vars),
            restarts: R::new(),
            clause_increment: 1.0,
            max_learnts,
            stats: Stats::default(),
            ok: true,
            formula,
        };

        // ground facts and contradictions visible at construction time
        for cref in 0..solver.formula.len() {
            match solver.formula[cref].len() {
                0 => solver.ok = false,
                1 => {
                    let unit = solver.formula[cref][0];
                    if !solver
                        .trail
                        .enqueue(unit, Some(cref), &mut solver.assignment)
                    {
                        solver.ok = false;
                    }
                }
                _ => {}
            }
        }

        solver
    }

    /// Decides the instance. Deterministic: the same formula always takes
    /// the same search path.
    pub fn check(&mut self) -> Status {
        if !self.ok {
            return Status::Unsat;
        }
        self.trail
            .undo_until(0, &mut self.assignment, &mut self.phases);
        if !self.simplify() {
            self.ok = false;
            return Status::Unsat;
        }

        loop {
            if let Some(conflict) =
                self.propagator
                    .propagate(&mut self.formula, &mut self.trail, &mut self.assignment)
            {
                self.stats.conflicts += 1;
                if self.trail.decision_level() == 0 {
                    self.ok = false;
                    return Status::Unsat;
                }
                trace!(
                    conflict,
                    level = self.trail.decision_level(),
                    "analysing conflict"
                );
                if tracing::enabled!(tracing::Level::TRACE) {
                    trace!(
                        "implication graph:\n{}",
                        self.trail.implication_graph_dot(&self.formula, Some(conflict))
                    );
                }
                self.learn_from(conflict);

                if self.restarts.should_restart() {
                    self.stats.restarts += 1;
                    debug!(restarts = self.stats.restarts, "restarting");
                    self.trail
                        .undo_until(0, &mut self.assignment, &mut self.phases);
                    if !self.simplify() {
                        self.ok = false;
                        return Status::Unsat;
                    }
                }

                if self.formula.learnt_count() > self.max_learnts {
                    self.reduce();
                }
            } else if self.assignment.all_assigned() {
                return Status::Sat;
            } else {
                self.decide();
            }
        }
    }

    /// The model found by a Sat run: `num_vars + 1` booleans, index 0 false.
    #[must_use]
    pub fn model(&self) -> Vec<bool> {
        self.assignment.model()
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        let mut stats = self.stats;
        #[allow(clippy::cast_possible_truncation)]
        {
            stats.propagations = self.propagator.propagations() as u64;
        }
        stats
    }

    fn decide(&mut self) {
        let var = self
            .order
            .pick(&self.assignment)
            .expect("an unassigned variable exists when not all are assigned");
        let lit = L::new(var, !self.phases.next(var));
        self.stats.decisions += 1;
        self.trail.push_decision(lit, &mut self.assignment);
    }

    /// Analyses `conflict`, backjumps and asserts the learnt clause.
    fn learn_from(&mut self, conflict: ClauseRef) {
        let analysis =
            self.analyser
                .analyse(&self.formula, &self.trail, &self.assignment, conflict);

        for &var in &analysis.bumped {
            self.order.bump(var);
        }
        for &cref in &analysis.resolved_learnts {
            self.bump_clause(cref);
        }
        self.order.decay();
        self.clause_increment /= CLAUSE_DECAY;

        self.stats.learnt_clauses += 1;
        self.trail
            .undo_until(analysis.backtrack_level, &mut self.assignment, &mut self.phases);

        let asserting = analysis.learnt[0];
        if analysis.learnt.len() == 1 {
            // permanently learnt unit: lives on the level-0 trail, not in
            // the arena
            debug_assert_eq!(self.trail.decision_level(), 0);
            let fresh = self.trail.enqueue(asserting, None, &mut self.assignment);
            debug_assert!(fresh);
        } else {
            let cref = self.formula.push_learnt(Clause::learnt(analysis.learnt));
            self.bump_clause(cref);
            self.propagator.attach(&self.formula, cref);
            let fresh = self
                .trail
                .enqueue(asserting, Some(cref), &mut self.assignment);
            debug_assert!(fresh);
        }
    }

    fn bump_clause(&mut self, cref: ClauseRef) {
        self.formula[cref].bump_activity(self.clause_increment);
        if self.formula[cref].activity() > CLAUSE_RESCALE_LIMIT {
            for clause in self.formula.learnt_clauses_mut() {
                clause.scale_activity(CLAUSE_RESCALE_FACTOR);
            }
            self.clause_increment *= CLAUSE_RESCALE_FACTOR;
        }
    }

    /// Level-0 simplification to a fixed point: propagate, assign pure
    /// literals, drop satisfied clauses, strip false literals, rebuild.
    /// Returns false when the instance is unsatisfiable.
    ///
    /// Running it again immediately changes nothing, and clause handles are
    /// only stable across it because every reason is cleared and every watch
    /// rebuilt before it returns.
    pub fn simplify(&mut self) -> bool {
        debug_assert_eq!(self.trail.decision_level(), 0);
        loop {
            if self
                .propagator
                .propagate(&mut self.formula, &mut self.trail, &mut self.assignment)
                .is_some()
            {
                return false;
            }

            let mut changed = false;

            for lit in simplify::pure_literals(&self.formula, &self.assignment) {
                self.stats.pure_literals += 1;
                let fresh = self.trail.enqueue(lit, None, &mut self.assignment);
                debug_assert!(fresh);
                changed = true;
            }

            let (removed_inputs, removed_learnts) =
                simplify::drop_satisfied(&mut self.formula, &self.assignment);
            let removed = removed_inputs + removed_learnts;
            let (stripped, emptied) =
                simplify::strip_false_literals(&mut self.formula, &self.assignment);
            if emptied {
                return false;
            }
            self.stats.simplified_clauses += removed as u64;

            if removed > 0 || stripped > 0 {
                // handles moved or clause shapes changed
                self.trail.clear_reasons();
                self.propagator.rebuild(&self.formula);
                for cref in 0..self.formula.len() {
                    if self.formula[cref].len() == 1 {
                        let unit = self.formula[cref][0];
                        if !self.trail.enqueue(unit, Some(cref), &mut self.assignment) {
                            return false;
                        }
                    }
                }
                changed = true;
            }

            if !changed {
                debug!(
                    clauses = self.formula.len(),
                    assigned = self.trail.len(),
                    "simplification reached a fixed point"
                );
                return true;
            }
        }
    }

    /// Is the clause the reason of its own first literal's assignment?
    /// Locked clauses must survive database reduction.
    fn is_locked(&self, cref: ClauseRef) -> bool {
        let first = self.formula[cref][0];
        self.assignment.literal_value(first) == Some(true)
            && self.trail.reason_of(first.variable()) == Some(cref)
    }

    /// Halves the learnt database: drops the lowest-activity unlocked learnt
    /// clauses (binary clauses are spared) plus anything below the dynamic
    /// activity threshold, then compacts the arena, remapping reasons and
    /// rebuilding watch lists.
    fn reduce(&mut self) {
        let first_learnt = self.formula.first_learnt();
        let learnt_count = self.formula.learnt_count();
        if learnt_count == 0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let threshold = self.clause_increment / learnt_count as f64;

        let mut candidates: Vec<(ClauseRef, f64)> = (first_learnt..self.formula.len())
            .filter(|&cref| self.formula[cref].len() > 2 && !self.is_locked(cref))
            .map(|cref| (cref, self.formula[cref].activity()))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let half = candidates.len() / 2;
        let mut doomed: FxHashSet<ClauseRef> = FxHashSet::default();
        for (rank, &(cref, activity)) in candidates.iter().enumerate() {
            if rank < half || activity < threshold {
                doomed.insert(cref);
            }
        }
        if doomed.is_empty() {
            self.max_learnts = self.max_learnts * 3 / 2;
            return;
        }

        let mut remap: FxHashMap<ClauseRef, ClauseRef> = FxHashMap::default();
        let clauses = std::mem::take(&mut self.formula.clauses);
        let mut kept = Vec::with_capacity(clauses.len() - doomed.len());
        for (old, clause) in clauses.into_iter().enumerate() {
            if doomed.contains(&old) {
                continue;
            }
            remap.insert(old, kept.len());
            kept.push(clause);
        }
        self.formula.clauses = kept;

        self.trail.remap_reasons(&remap);
        self.propagator.rebuild(&self.formula);

        self.stats.reduced_clauses += doomed.len() as u64;
        self.max_learnts = self.max_learnts * 3 / 2;
        debug!(
            removed = doomed.len(),
            remaining = self.formula.learnt_count(),
            "reduced the learnt database"
        );
    }
}
