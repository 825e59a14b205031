//! Unit propagation with two watched literals.
//!
//! The propagator drains the trail's FIFO queue. For each literal that became
//! true it visits the watch list of the falsified opposite literal and
//! restores the watch invariant for every clause there: a clause either
//! stays watched on two non-false literals, moves a watch to a fresh
//! non-false literal, propagates its remaining literal, or is conflicting.
//!
//! Watch maintenance keeps three facts the rest of the solver relies on:
//! the watched literals of a clause are its positions 0 and 1, the implied
//! literal of a propagating clause ends up at position 0, and a watcher list
//! is visited and compacted in order, so propagation is deterministic.

use crate::assignment::Assignment;
use crate::formula::{ClauseRef, Formula};
use crate::literal::Literal;
use crate::trail::Trail;
use crate::watch::{WatchLists, Watcher};

#[derive(Debug, Clone)]
pub struct Propagator<L: Literal> {
    watches: WatchLists<L>,
    propagations: usize,
}

impl<L: Literal> Propagator<L> {
    /// Builds watch lists for every clause of the formula with at least two
    /// literals. Unit and empty input clauses are the constructor's problem
    /// (`Solver::new` enqueues or rejects them).
    #[must_use]
    pub fn new(formula: &Formula<L>) -> Self {
        let mut propagator = Self {
            watches: WatchLists::new(formula.num_vars()),
            propagations: 0,
        };
        for cref in 0..formula.len() {
            if formula[cref].len() >= 2 {
                propagator.attach(formula, cref);
            }
        }
        propagator
    }

    /// Starts watching a clause on its first two literals.
    pub fn attach(&mut self, formula: &Formula<L>, cref: ClauseRef) {
        let clause = &formula[cref];
        debug_assert!(clause.len() >= 2, "cannot watch a short clause");
        self.watches.watch_clause(cref, clause[0], clause[1]);
    }

    /// Rebuilds every watch list from scratch. Called after clause handles
    /// moved (simplification, database reduction).
    pub fn rebuild(&mut self, formula: &Formula<L>) {
        self.watches.clear();
        for cref in 0..formula.len() {
            if formula[cref].len() >= 2 {
                self.attach(formula, cref);
            }
        }
    }

    #[must_use]
    pub fn propagations(&self) -> usize {
        self.propagations
    }

    /// Propagates until the queue drains or a clause is conflicting. On
    /// conflict the queue is cleared and the clause handle returned.
    pub fn propagate(
        &mut self,
        formula: &mut Formula<L>,
        trail: &mut Trail<L>,
        assignment: &mut Assignment,
    ) -> Option<ClauseRef> {
        while let Some(lit) = trail.pop_queued() {
            self.propagations += 1;
            if let Some(conflict) = self.falsify(lit.negated(), formula, trail, assignment) {
                trail.clear_queue();
                return Some(conflict);
            }
        }
        None
    }

    /// Visits every watcher of `false_lit`, which just became false.
    fn falsify(
        &mut self,
        false_lit: L,
        formula: &mut Formula<L>,
        trail: &mut Trail<L>,
        assignment: &mut Assignment,
    ) -> Option<ClauseRef> {
        let mut watchers = self.watches.take(false_lit);
        let mut conflict = None;
        let mut kept = 0;
        let mut i = 0;

        'watchers: while i < watchers.len() {
            let Watcher { clause: cref, blocker } = watchers[i];
            i += 1;

            // satisfied through the blocker: nothing to do
            if assignment.literal_value(blocker) == Some(true) {
                watchers[kept] = Watcher { clause: cref, blocker };
                kept += 1;
                continue;
            }

            let first;
            let moved_to;
            {
                let clause = &mut formula[cref];
                // normalise: position 1 holds the falsified watch
                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }
                debug_assert_eq!(clause[1], false_lit);
                first = clause[0];

                if first != blocker && assignment.literal_value(first) == Some(true) {
                    // satisfied through the other watch; remember it as blocker
                    watchers[kept] = Watcher { clause: cref, blocker: first };
                    kept += 1;
                    continue 'watchers;
                }

                moved_to = (2..clause.len())
                    .find(|&k| assignment.literal_value(clause[k]) != Some(false));
                if let Some(k) = moved_to {
                    clause.swap(1, k);
                }
            }

            if moved_to.is_some() {
                // watch migrates to the fresh literal; drop it from this list
                let new_watch = formula[cref][1];
                self.watches.add(
                    new_watch,
                    Watcher { clause: cref, blocker: first },
                );
                continue;
            }

            // no replacement: the clause is unit on `first`, or conflicting
            watchers[kept] = Watcher { clause: cref, blocker: first };
            kept += 1;

            match assignment.literal_value(first) {
                Some(false) => {
                    // conflicting clause: keep the untouched tail and stop
                    while i < watchers.len() {
                        watchers[kept] = watchers[i];
                        kept += 1;
                        i += 1;
                    }
                    conflict = Some(cref);
                }
                Some(true) => {}
                None => {
                    let fresh = trail.enqueue(first, Some(cref), assignment);
                    debug_assert!(fresh);
                }
            }
        }

        watchers.truncate(kept);
        self.watches.put_back(false_lit, watchers);
        conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::SavedPhases;
    use crate::literal::PackedLiteral;

    type Lit = PackedLiteral;

    fn lit(value: i32) -> Lit {
        Lit::from_dimacs(value)
    }

    fn setup(
        num_vars: usize,
        clauses: Vec<Vec<i32>>,
    ) -> (Formula<Lit>, Propagator<Lit>, Trail<Lit>, Assignment) {
        let formula: Formula<Lit> = Formula::new(num_vars, clauses);
        let propagator = Propagator::new(&formula);
        let trail = Trail::new(num_vars);
        let assignment = Assignment::new(num_vars);
        (formula, propagator, trail, assignment)
    }

    #[test]
    fn propagates_a_chain_of_implications() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(4, vec![vec![-1, 2], vec![-2, 3], vec![-3, 4]]);

        trail.push_decision(lit(1), &mut assignment);
        let conflict = propagator.propagate(&mut formula, &mut trail, &mut assignment);

        assert_eq!(conflict, None);
        assert_eq!(trail.len(), 4);
        for var in 1..=4 {
            assert_eq!(assignment.value_of(var), Some(true));
        }
        assert_eq!(trail.reason_of(2), Some(0));
        assert_eq!(trail.reason_of(3), Some(1));
        assert_eq!(trail.reason_of(4), Some(2));
        assert_eq!(propagator.propagations(), 4);
    }

    #[test]
    fn implied_literal_lands_at_position_zero() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(2, vec![vec![-1, 2]]);

        trail.push_decision(lit(1), &mut assignment);
        propagator.propagate(&mut formula, &mut trail, &mut assignment);

        assert_eq!(formula[0][0], lit(2));
        assert_eq!(formula[0][1], lit(-1));
    }

    #[test]
    fn reports_the_conflicting_clause() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(2, vec![vec![-1, 2], vec![-1, -2]]);

        trail.push_decision(lit(1), &mut assignment);
        let conflict = propagator.propagate(&mut formula, &mut trail, &mut assignment);

        assert_eq!(conflict, Some(1));
        // the queue is cleared on conflict
        assert_eq!(trail.pop_queued(), None);
    }

    #[test]
    fn moves_the_watch_to_a_non_false_literal() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(4, vec![vec![-1, -2, 3, 4]]);

        trail.push_decision(lit(1), &mut assignment);
        let conflict = propagator.propagate(&mut formula, &mut trail, &mut assignment);
        assert_eq!(conflict, None);
        // nothing was implied, the clause still has two free literals
        assert_eq!(trail.len(), 1);

        // the falsified literal -1 is no longer watched
        assert!(propagator.watches[lit(-1)].is_empty());
        let watched: Vec<Lit> = vec![formula[0][0], formula[0][1]];
        assert!(!watched.contains(&lit(-1)));
    }

    #[test]
    fn satisfied_clause_keeps_its_watch_through_the_blocker() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(2, vec![vec![1, 2]]);

        trail.enqueue(lit(1), None, &mut assignment);
        propagator.propagate(&mut formula, &mut trail, &mut assignment);

        // now falsify the other watched literal; clause stays registered
        trail.push_decision(lit(-2), &mut assignment);
        let conflict = propagator.propagate(&mut formula, &mut trail, &mut assignment);
        assert_eq!(conflict, None);
        assert_eq!(propagator.watches[lit(2)].len(), 1);
        assert_eq!(propagator.watches[lit(1)].len(), 1);
    }

    #[test]
    fn unit_under_assignment_propagates_with_reason() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(3, vec![vec![-1, -2, 3]]);

        trail.push_decision(lit(1), &mut assignment);
        propagator.propagate(&mut formula, &mut trail, &mut assignment);
        trail.push_decision(lit(2), &mut assignment);
        let conflict = propagator.propagate(&mut formula, &mut trail, &mut assignment);

        assert_eq!(conflict, None);
        assert_eq!(assignment.value_of(3), Some(true));
        assert_eq!(trail.reason_of(3), Some(0));
        assert_eq!(trail.level_of(3), 2);
    }

    #[test]
    fn backtracking_needs_no_watch_repair() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(3, vec![vec![-1, 2], vec![-2, 3]]);
        let mut phases = SavedPhases::new(3);

        trail.push_decision(lit(1), &mut assignment);
        propagator.propagate(&mut formula, &mut trail, &mut assignment);
        trail.undo_until(0, &mut assignment, &mut phases);

        // same decision again: propagation works against the same watches
        trail.push_decision(lit(-3), &mut assignment);
        let conflict = propagator.propagate(&mut formula, &mut trail, &mut assignment);
        assert_eq!(conflict, None);
        assert_eq!(assignment.value_of(2), Some(false));
    }

    /// Invariant: every clause of length >= 2 has exactly two watch
    /// records, registered under its first two literals.
    fn assert_watch_invariant(propagator: &Propagator<Lit>, formula: &Formula<Lit>) {
        let mut counts = vec![0usize; formula.len()];
        for (code, watcher) in propagator.watches.iter_entries() {
            let clause = &formula[watcher.clause];
            counts[watcher.clause] += 1;
            let registered = Lit::from_code(code);
            assert!(
                clause[0] == registered || clause[1] == registered,
                "watch under a literal that is not in a watched slot"
            );
        }
        for (cref, count) in counts.iter().enumerate() {
            let expected = usize::from(formula[cref].len() >= 2) * 2;
            assert_eq!(*count, expected, "clause {cref} has {count} watches");
        }
    }

    #[test]
    fn every_long_clause_keeps_exactly_two_watches() {
        let (mut formula, mut propagator, mut trail, mut assignment) = setup(
            5,
            vec![
                vec![-1, -2, 3, 4],
                vec![-1, 2],
                vec![-3, -4, 5],
                vec![1, 2, 3, 4, 5],
            ],
        );
        assert_watch_invariant(&propagator, &formula);

        trail.push_decision(lit(1), &mut assignment);
        propagator.propagate(&mut formula, &mut trail, &mut assignment);
        assert_watch_invariant(&propagator, &formula);

        trail.push_decision(lit(-4), &mut assignment);
        propagator.propagate(&mut formula, &mut trail, &mut assignment);
        assert_watch_invariant(&propagator, &formula);
    }

    /// Invariant: an implied literal appears in its reason clause and
    /// every other literal of the reason is false and earlier on the trail.
    #[test]
    fn reasons_point_backwards_along_the_trail() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(4, vec![vec![-1, 2], vec![-2, -1, 3], vec![-3, -2, 4]]);

        trail.push_decision(lit(1), &mut assignment);
        propagator.propagate(&mut formula, &mut trail, &mut assignment);

        for position in 0..trail.len() {
            let implied = trail[position];
            let Some(cref) = trail.reason_of(implied.variable()) else {
                continue;
            };
            let clause = &formula[cref];
            assert!(clause.iter().any(|&l| l == implied));
            for &other in clause.iter().filter(|&&l| l != implied) {
                assert_eq!(assignment.literal_value(other), Some(false));
                assert!(trail.position_of(other.variable()) < position);
            }
        }
    }

    #[test]
    fn rebuild_restores_watching_after_handle_moves() {
        let (mut formula, mut propagator, mut trail, mut assignment) =
            setup(3, vec![vec![-1, 2], vec![-2, 3]]);

        // pretend a cleanup pass dropped the first clause
        formula.clauses.remove(0);
        formula.first_learnt -= 1;
        propagator.rebuild(&formula);

        trail.push_decision(lit(2), &mut assignment);
        let conflict = propagator.propagate(&mut formula, &mut trail, &mut assignment);
        assert_eq!(conflict, None);
        assert_eq!(assignment.value_of(3), Some(true));
        assert_eq!(trail.reason_of(3), Some(0));
    }
}
