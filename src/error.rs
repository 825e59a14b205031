//! Errors reported by the parser and by instance construction.
//!
//! The solver core never produces these: an unsatisfiable formula is a
//! regular `Unsat` answer, and internal invariant breaches are bugs handled
//! by assertions, not recoverable errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing `p cnf <vars> <clauses>` header")]
    MissingHeader,

    #[error("malformed problem header: `{0}`")]
    BadHeader(String),

    #[error("malformed literal: `{0}`")]
    BadLiteral(String),

    #[error("literal {literal} out of range for {num_vars} variables")]
    LiteralOutOfRange { literal: i32, num_vars: usize },

    #[error("header promised {expected} clauses but the input holds {found}")]
    MissingClauses { expected: usize, found: usize },

    #[error("last clause is not terminated by 0")]
    UnterminatedClause,
}
