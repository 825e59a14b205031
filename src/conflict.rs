//! Conflict analysis: the first unique implication point (1-UIP) cut.
//!
//! Starting from the conflicting clause, the analyser resolves backwards
//! along the trail against the reason clause of each marked literal of the
//! current decision level, until exactly one marked literal of that level
//! remains. That literal is the first UIP; its negation becomes the
//! asserting literal of the learnt clause.
//!
//! The walk is linear: a `seen` bit per variable marks membership in the
//! pending resolvent, a counter tracks how many marked literals of the
//! current level are still unresolved, and a cursor moves backwards over the
//! trail. Literals assigned at level 0 are never added to the resolvent;
//! they are false by construction and stay false forever.
//!
//! Output layout: the asserting literal is at index 0 and the remaining
//! literal with the highest decision level at index 1, so the caller can
//! watch positions 0 and 1 directly. After backjumping to the returned
//! level the clause is unit on its asserting literal.

use crate::assignment::Assignment;
use crate::clause::LiteralVec;
use crate::formula::{ClauseRef, Formula};
use crate::literal::{Literal, Variable};
use crate::trail::Trail;
use bit_vec::BitVec;
use smallvec::{smallvec, SmallVec};

/// Result of analysing one conflict.
#[derive(Debug, Clone)]
pub struct Analysis<L: Literal> {
    /// Learnt clause literals; asserting literal first.
    pub learnt: LiteralVec<L>,
    /// Level to backjump to; the learnt clause is unit there.
    pub backtrack_level: usize,
    /// Variables that took part in the resolution, for activity bumping.
    pub bumped: SmallVec<[Variable; 12]>,
    /// Learnt clauses met during resolution, for clause-activity bumping.
    pub resolved_learnts: SmallVec<[ClauseRef; 8]>,
}

/// Reusable analysis state. Keeping the `seen` bits allocated across
/// conflicts is what makes the analysis allocation-free in the steady state.
#[derive(Debug, Clone)]
pub struct Analyser {
    seen: BitVec,
    to_clear: Vec<Variable>,
    /// Conflicts analysed, for statistics.
    pub count: usize,
}

impl Analyser {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            seen: BitVec::from_elem(num_vars + 1, false),
            to_clear: Vec::new(),
            count: 0,
        }
    }

    /// Derives the 1-UIP learnt clause for `conflict`.
    ///
    /// Precondition: the current decision level is at least 1 (level-0
    /// conflicts mean Unsat and are handled by the driver), and every
    /// implied literal's reason clause carries it at position 0.
    pub fn analyse<L: Literal>(
        &mut self,
        formula: &Formula<L>,
        trail: &Trail<L>,
        assignment: &Assignment,
        conflict: ClauseRef,
    ) -> Analysis<L> {
        let current_level = trail.decision_level();
        debug_assert!(current_level > 0, "ground conflicts are not analysed");
        self.count += 1;

        // index 0 is reserved for the asserting literal
        let mut learnt: LiteralVec<L> = smallvec![L::default()];
        let mut bumped: SmallVec<[Variable; 12]> = SmallVec::new();
        let mut resolved_learnts: SmallVec<[ClauseRef; 8]> = SmallVec::new();

        let mut unresolved = 0usize;
        let mut cursor = trail.len();
        let mut cref = conflict;
        let mut pivot: Option<L> = None;

        let asserting = loop {
            let clause = &formula[cref];
            if clause.is_learnt() {
                resolved_learnts.push(cref);
            }

            // resolve the clause in; a reason clause's position 0 holds the
            // pivot itself and is skipped
            for &lit in clause.iter().skip(usize::from(pivot.is_some())) {
                let var = lit.variable();
                if !self.seen[var as usize] && trail.level_of(var) > 0 {
                    self.seen.set(var as usize, true);
                    self.to_clear.push(var);
                    bumped.push(var);
                    if trail.level_of(var) >= current_level {
                        unresolved += 1;
                    } else {
                        learnt.push(lit);
                    }
                }
            }

            // most recently assigned marked literal
            loop {
                cursor -= 1;
                if self.seen[trail[cursor].variable() as usize] {
                    break;
                }
            }
            let lit = trail[cursor];
            self.seen.set(lit.variable() as usize, false);
            unresolved -= 1;
            if unresolved == 0 {
                break lit.negated();
            }
            cref = trail
                .reason_of(lit.variable())
                .expect("a non-UIP literal of the conflict level must be implied");
            pivot = Some(lit);
        };
        learnt[0] = asserting;

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            // highest remaining level moves to index 1, the second watch
            let mut deepest = 1;
            for i in 2..learnt.len() {
                if trail.level_of(learnt[i].variable())
                    > trail.level_of(learnt[deepest].variable())
                {
                    deepest = i;
                }
            }
            learnt.swap(1, deepest);
            trail.level_of(learnt[1].variable())
        };

        for &var in &self.to_clear {
            self.seen.set(var as usize, false);
        }
        self.to_clear.clear();

        debug_assert!(
            learnt
                .iter()
                .all(|&lit| assignment.literal_value(lit) == Some(false)),
            "a learnt clause must be false under the conflicting assignment"
        );
        debug_assert!(backtrack_level < current_level);

        Analysis {
            learnt,
            backtrack_level,
            bumped,
            resolved_learnts,
        }
    }
}
