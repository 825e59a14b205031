//! Level-0 clause cleaning helpers.
//!
//! These run only at decision level 0, where assignments are permanent, so
//! removing a satisfied clause or stripping a false literal preserves
//! equivalence. The driver (`Solver::simplify`) loops them to a fixed point
//! and rebuilds watches afterwards, since both passes move clause handles
//! or change clause shapes.

use crate::assignment::Assignment;
use crate::formula::Formula;
use crate::literal::{Literal, Variable};

/// Finds literals that occur in only one polarity across the clauses not yet
/// satisfied. Assigning a pure literal can only satisfy clauses, never
/// falsify one.
pub(crate) fn pure_literals<L: Literal>(
    formula: &Formula<L>,
    assignment: &Assignment,
) -> Vec<L> {
    let num_vars = formula.num_vars();
    let mut positive = vec![false; num_vars + 1];
    let mut negative = vec![false; num_vars + 1];

    for clause in formula.iter() {
        if clause
            .iter()
            .any(|&lit| assignment.literal_value(lit) == Some(true))
        {
            continue;
        }
        for &lit in clause.iter() {
            if assignment.is_assigned(lit.variable()) {
                continue;
            }
            let var = lit.variable() as usize;
            if lit.is_negative() {
                negative[var] = true;
            } else {
                positive[var] = true;
            }
        }
    }

    (1..=num_vars)
        .filter_map(|var| {
            #[allow(clippy::cast_possible_truncation)]
            let v = var as Variable;
            match (positive[var], negative[var]) {
                (true, false) => Some(L::new(v, false)),
                (false, true) => Some(L::new(v, true)),
                _ => None,
            }
        })
        .collect()
}

/// Removes every clause containing a true literal. Returns how many input
/// and learnt clauses were dropped; the learnt boundary is adjusted.
pub(crate) fn drop_satisfied<L: Literal>(
    formula: &mut Formula<L>,
    assignment: &Assignment,
) -> (usize, usize) {
    let first_learnt = formula.first_learnt;
    let clauses = std::mem::take(&mut formula.clauses);
    let mut removed_inputs = 0;
    let mut removed_learnts = 0;

    formula.clauses = clauses
        .into_iter()
        .enumerate()
        .filter_map(|(index, clause)| {
            let satisfied = clause
                .iter()
                .any(|&lit| assignment.literal_value(lit) == Some(true));
            if satisfied {
                if index < first_learnt {
                    removed_inputs += 1;
                } else {
                    removed_learnts += 1;
                }
                None
            } else {
                Some(clause)
            }
        })
        .collect();

    formula.first_learnt -= removed_inputs;
    (removed_inputs, removed_learnts)
}

/// Strips false literals out of the remaining clauses. Returns the number of
/// literals removed and whether some clause became empty (which means the
/// instance is unsatisfiable).
pub(crate) fn strip_false_literals<L: Literal>(
    formula: &mut Formula<L>,
    assignment: &Assignment,
) -> (usize, bool) {
    let mut removed = 0;
    let mut emptied = false;
    for clause in &mut formula.clauses {
        let before = clause.len();
        clause.retain(|lit| assignment.literal_value(*lit) != Some(false));
        removed += before - clause.len();
        if clause.is_empty() && before > 0 {
            emptied = true;
        }
    }
    (removed, emptied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::PackedLiteral;

    type Lit = PackedLiteral;

    fn lit(value: i32) -> Lit {
        Lit::from_dimacs(value)
    }

    #[test]
    fn detects_pure_literals() {
        // 1 occurs only positively, 3 only negatively, 2 in both polarities
        let formula: Formula<Lit> = Formula::new(3, vec![vec![1, 2], vec![1, -2, -3], vec![-3]]);
        let assignment = Assignment::new(3);

        let mut pures: Vec<i32> = pure_literals(&formula, &assignment)
            .into_iter()
            .map(|l: Lit| l.to_dimacs())
            .collect();
        pures.sort_unstable();
        assert_eq!(pures, vec![-3, 1]);
    }

    #[test]
    fn satisfied_clauses_do_not_block_purity() {
        // ¬2 only occurs in a clause already satisfied by 1
        let formula: Formula<Lit> = Formula::new(2, vec![vec![1, -2], vec![2]]);
        let mut assignment = Assignment::new(2);
        assignment.assign(lit(1));

        let pures: Vec<Lit> = pure_literals(&formula, &assignment);
        assert_eq!(pures, vec![lit(2)]);
    }

    #[test]
    fn drop_satisfied_adjusts_the_learnt_boundary() {
        let mut formula: Formula<Lit> = Formula::new(3, vec![vec![1, 2], vec![-1, 3], vec![2, 3]]);
        let mut assignment = Assignment::new(3);
        assignment.assign(lit(1));

        let (inputs, learnts) = drop_satisfied(&mut formula, &assignment);
        assert_eq!((inputs, learnts), (1, 0));
        assert_eq!(formula.len(), 2);
        assert_eq!(formula.first_learnt(), 2);
    }

    #[test]
    fn strip_false_literals_reports_emptied_clauses() {
        let mut formula: Formula<Lit> = Formula::new(3, vec![vec![-1, 2], vec![-1]]);
        let mut assignment = Assignment::new(3);
        assignment.assign(lit(1));

        let (removed, emptied) = strip_false_literals(&mut formula, &assignment);
        assert_eq!(removed, 2);
        assert!(emptied);
        assert_eq!(formula[0].len(), 1);
        assert!(formula[1].is_empty());
    }

    #[test]
    fn strip_keeps_untouched_clauses_intact() {
        let mut formula: Formula<Lit> = Formula::new(3, vec![vec![2, 3]]);
        let assignment = Assignment::new(3);
        let (removed, emptied) = strip_false_literals(&mut formula, &assignment);
        assert_eq!(removed, 0);
        assert!(!emptied);
        assert_eq!(formula[0].len(), 2);
    }
}
