//! Per-literal watch lists.
//!
//! Every clause of length two or more has exactly two watched literals, kept
//! at clause positions 0 and 1. A [`Watcher`] is registered under each of
//! them and carries a blocker: another literal of the same clause whose truth
//! proves the clause satisfied without loading it. Watch lists are indexed by
//! [`Literal::code`], so the table has `2 * (N + 1)` slots.

use crate::formula::ClauseRef;
use crate::literal::Literal;
use smallvec::SmallVec;
use std::ops::Index;

pub(crate) type WatcherVec<L> = SmallVec<[Watcher<L>; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watcher<L: Literal> {
    pub clause: ClauseRef,
    pub blocker: L,
}

#[derive(Debug, Clone)]
pub struct WatchLists<L: Literal> {
    lists: Vec<WatcherVec<L>>,
}

impl<L: Literal> WatchLists<L> {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            lists: vec![SmallVec::new(); 2 * (num_vars + 1)],
        }
    }

    /// Registers the two watches for a clause whose first two literals are
    /// `first` and `second`, each carrying the other as its blocker.
    pub fn watch_clause(&mut self, cref: ClauseRef, first: L, second: L) {
        debug_assert_ne!(first, second, "a clause cannot watch one literal twice");
        self.lists[first.code()].push(Watcher {
            clause: cref,
            blocker: second,
        });
        self.lists[second.code()].push(Watcher {
            clause: cref,
            blocker: first,
        });
    }

    pub fn add(&mut self, lit: L, watcher: Watcher<L>) {
        self.lists[lit.code()].push(watcher);
    }

    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }

    /// Detaches the list for `lit` so the caller can walk it while pushing
    /// watches onto other lists. Pair with [`WatchLists::put_back`].
    pub(crate) fn take(&mut self, lit: L) -> WatcherVec<L> {
        std::mem::take(&mut self.lists[lit.code()])
    }

    pub(crate) fn put_back(&mut self, lit: L, list: WatcherVec<L>) {
        debug_assert!(self.lists[lit.code()].is_empty());
        self.lists[lit.code()] = list;
    }

    /// Every watcher in every list, paired with the literal code it is
    /// registered under. Used by invariant checks in tests.
    pub(crate) fn iter_entries(&self) -> impl Iterator<Item = (usize, &Watcher<L>)> + '_ {
        self.lists
            .iter()
            .enumerate()
            .flat_map(|(code, list)| list.iter().map(move |watcher| (code, watcher)))
    }
}

impl<L: Literal> Index<L> for WatchLists<L> {
    type Output = [Watcher<L>];

    fn index(&self, lit: L) -> &[Watcher<L>] {
        &self.lists[lit.code()]
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
    fn watch_clause_registers_both_sides() {
        let mut watches: WatchLists<PackedLiteral> = WatchLists::new(3);
        watches.watch_clause(0, lit(1), lit(-2));

        assert_eq!(watches[lit(1)].len(), 1);
        assert_eq!(watches[lit(1)][0].clause, 0);
        assert_eq!(watches[lit(1)][0].blocker, lit(-2));

        assert_eq!(watches[lit(-2)].len(), 1);
        assert_eq!(watches[lit(-2)][0].blocker, lit(1));

        // the other polarity of 2 watches nothing
        assert!(watches[lit(2)].is_empty());
    }

    #[test]
    fn take_and_put_back() {
        let mut watches: WatchLists<PackedLiteral> = WatchLists::new(2);
        watches.watch_clause(4, lit(1), lit(2));

        let taken = watches.take(lit(1));
        assert_eq!(taken.len(), 1);
        assert!(watches[lit(1)].is_empty());

        watches.put_back(lit(1), taken);
        assert_eq!(watches[lit(1)].len(), 1);
    }

    #[test]
    fn clear_empties_every_list() {
        let mut watches: WatchLists<PackedLiteral> = WatchLists::new(2);
        watches.watch_clause(0, lit(1), lit(2));
        watches.watch_clause(1, lit(-1), lit(-2));
        watches.clear();
        assert!(watches[lit(1)].is_empty());
        assert!(watches[lit(-1)].is_empty());
    }
}
