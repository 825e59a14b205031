//! The assignment trail and propagation queue.
//!
//! The trail records every assignment in chronological order. `heads[d]` is
//! the trail length immediately before decision level `d + 1` was pushed, so
//! the current decision level is `heads.len()`. For each assigned variable
//! the trail also tracks the level it was assigned at, its position on the
//! trail, and the clause that implied it (`None` for decisions and
//! pure-literal assignments). Those three tables are only meaningful while
//! the variable is assigned.
//!
//! Newly assigned literals are appended to a FIFO queue for the propagator
//! to drain; backtracking clears the queue.

use crate::assignment::Assignment;
use crate::decision::SavedPhases;
use crate::formula::{ClauseRef, Formula};
use crate::literal::{Literal, Variable};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::ops::Index;

#[derive(Debug, Clone)]
pub struct Trail<L: Literal> {
    entries: Vec<L>,
    heads: Vec<usize>,
    levels: Vec<usize>,
    positions: Vec<usize>,
    reasons: Vec<Option<ClauseRef>>,
    queue: VecDeque<L>,
}

impl<L: Literal> Trail<L> {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_vars),
            heads: Vec::new(),
            levels: vec![0; num_vars + 1],
            positions: vec![0; num_vars + 1],
            reasons: vec![None; num_vars + 1],
            queue: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.heads.len()
    }

    /// Level the variable was assigned at. Only valid while assigned.
    #[must_use]
    pub fn level_of(&self, var: Variable) -> usize {
        self.levels[var as usize]
    }

    /// Trail position of the variable's assignment. Only valid while assigned.
    #[must_use]
    pub fn position_of(&self, var: Variable) -> usize {
        self.positions[var as usize]
    }

    #[must_use]
    pub fn reason_of(&self, var: Variable) -> Option<ClauseRef> {
        self.reasons[var as usize]
    }

    /// Makes `lit` true at the current decision level.
    ///
    /// Returns false when `lit` is already falsified — the caller decides
    /// what a contradiction means at its level (at level 0 it means Unsat).
    /// Re-enqueueing an already-true literal is a no-op.
    pub fn enqueue(&mut self, lit: L, reason: Option<ClauseRef>, assignment: &mut Assignment) -> bool {
        match assignment.literal_value(lit) {
            Some(value) => value,
            None => {
                assignment.assign(lit);
                let var = lit.variable() as usize;
                self.levels[var] = self.decision_level();
                self.positions[var] = self.entries.len();
                self.reasons[var] = reason;
                self.entries.push(lit);
                self.queue.push_back(lit);
                true
            }
        }
    }

    /// Opens a new decision level and assigns `lit` as its decision.
    pub fn push_decision(&mut self, lit: L, assignment: &mut Assignment) {
        debug_assert!(
            !assignment.is_assigned(lit.variable()),
            "decision on an assigned variable"
        );
        self.heads.push(self.entries.len());
        let fresh = self.enqueue(lit, None, assignment);
        debug_assert!(fresh);
    }

    /// Undoes every assignment above `level`, saving phases for the popped
    /// variables, and drops the pending propagation queue.
    pub fn undo_until(
        &mut self,
        level: usize,
        assignment: &mut Assignment,
        phases: &mut SavedPhases,
    ) {
        if self.decision_level() <= level {
            return;
        }
        let keep = self.heads[level];
        for &lit in &self.entries[keep..] {
            let var = lit.variable();
            phases.save(var, lit.is_positive());
            assignment.unassign(var);
            self.reasons[var as usize] = None;
        }
        self.entries.truncate(keep);
        self.heads.truncate(level);
        self.queue.clear();
    }

    pub fn pop_queued(&mut self) -> Option<L> {
        self.queue.pop_front()
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Forgets every reason pointer. Level-0 simplification calls this when
    /// clause handles are about to move; ground assignments are permanent
    /// and never need their reasons again.
    pub(crate) fn clear_reasons(&mut self) {
        for &lit in &self.entries {
            self.reasons[lit.variable() as usize] = None;
        }
    }

    /// Rewrites reason handles through `map` after the clause arena was
    /// compacted. Every reachable reason must have an entry in the map.
    pub(crate) fn remap_reasons(&mut self, map: &rustc_hash::FxHashMap<ClauseRef, ClauseRef>) {
        for &lit in &self.entries {
            let var = lit.variable() as usize;
            if let Some(old) = self.reasons[var] {
                self.reasons[var] = Some(map[&old]);
            }
        }
    }

    /// Renders the implication graph in DOT format: one node per assigned
    /// literal, one edge per reason antecedent, and an optional conflict
    /// node. Debugging aid.
    #[must_use]
    pub fn implication_graph_dot(
        &self,
        formula: &Formula<L>,
        conflict: Option<ClauseRef>,
    ) -> String {
        let mut out = String::from("digraph implications {\n");
        for &lit in &self.entries {
            let var = lit.variable();
            let _ = writeln!(
                out,
                "  node_{var} [label=\"{var}:{}@{}\"];",
                lit.is_positive(),
                self.level_of(var)
            );
        }
        for &lit in &self.entries {
            let var = lit.variable();
            if let Some(cref) = self.reason_of(var) {
                for &other in formula[cref].iter() {
                    if other.variable() != var {
                        let _ = writeln!(
                            out,
                            "  node_{} -> node_{var} [label=\"{cref}\"];",
                            other.variable()
                        );
                    }
                }
            }
        }
        if let Some(cref) = conflict {
            for &lit in formula[cref].iter() {
                let _ = writeln!(out, "  node_{} -> conflict [label=\"{cref}\"];", lit.variable());
            }
        }
        out.push_str("}\n");
        out
    }
}

impl<L: Literal> Index<usize> for Trail<L> {
    type Output = L;

    fn index(&self, index: usize) -> &L {
        &self.entries[index]
    }
}
