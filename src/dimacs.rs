//! A parser for the DIMACS CNF file format.
//!
//! The format: `c` lines are comments, a single `p cnf <vars> <clauses>`
//! header announces the problem size, and each clause is a run of
//! whitespace-separated signed integers terminated by `0`. A clause may span
//! several lines and a line may hold several clauses. A `%` token marks the
//! end of data in some benchmark archives and is tolerated.

use crate::error::Error;
use crate::instance::Instance;
use std::io::BufRead;
use std::path::Path;

/// Parses DIMACS CNF data into an [`Instance`].
///
/// # Errors
///
/// Fails on I/O errors, a missing or malformed header, non-integer literal
/// tokens, literals outside `1..=num_vars`, a clause count short of the
/// header's promise, or a final clause missing its `0` terminator.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Instance, Error> {
    let mut header: Option<(usize, usize)> = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();
    let mut finished = false;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        let Some((_, expected)) = header else {
            let Some(rest) = line.strip_prefix('p') else {
                return Err(Error::MissingHeader);
            };
            let mut fields = rest.split_whitespace();
            let format = fields.next();
            let num_vars = fields.next().and_then(|s| s.parse::<usize>().ok());
            let num_clauses = fields.next().and_then(|s| s.parse::<usize>().ok());
            match (format, num_vars, num_clauses, fields.next()) {
                (Some("cnf"), Some(vars), Some(count), None) => {
                    header = Some((vars, count));
                    clauses.reserve(count);
                    continue;
                }
                _ => return Err(Error::BadHeader(line.to_owned())),
            }
        };

        if line.starts_with('%') {
            break;
        }
        for token in line.split_whitespace() {
            if token == "%" {
                finished = true;
                break;
            }
            let value: i32 = token
                .parse()
                .map_err(|_| Error::BadLiteral(token.to_owned()))?;
            if value == 0 {
                clauses.push(std::mem::take(&mut current));
                if clauses.len() == expected {
                    finished = true;
                    break;
                }
            } else {
                current.push(value);
            }
        }
        if finished {
            break;
        }
    }

    let Some((num_vars, expected)) = header else {
        return Err(Error::MissingHeader);
    };
    if !current.is_empty() {
        return Err(Error::UnterminatedClause);
    }
    if clauses.len() < expected {
        return Err(Error::MissingClauses {
            expected,
            found: clauses.len(),
        });
    }

    Instance::new(num_vars, clauses)
}

/// Opens and parses a DIMACS CNF file.
///
/// # Errors
///
/// Everything [`parse_dimacs`] reports, plus failures opening the file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Instance, Error> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Instance, Error> {
        parse_dimacs(Cursor::new(text))
    }

    #[test]
    fn plain_file() {
        let instance = parse("c comment\np cnf 3 2\n1 -2 0\n2 3 0\n").unwrap();
        assert_eq!(instance.num_vars(), 3);
        assert_eq!(instance.clauses(), &[vec![1, -2], vec![2, 3]]);
    }

    #[test]
    fn clause_spanning_lines_and_line_holding_clauses() {
        let instance = parse("p cnf 4 3\n1 2\n-3 0 4 0\n-1 -4 0\n").unwrap();
        assert_eq!(
            instance.clauses(),
            &[vec![1, 2, -3], vec![4], vec![-1, -4]]
        );
    }

    #[test]
    fn comments_and_blank_lines_anywhere() {
        let instance = parse("c a\n\np cnf 2 2\nc between\n1 0\n\nc more\n-2 0\n").unwrap();
        assert_eq!(instance.clauses(), &[vec![1], vec![-2]]);
    }

    #[test]
    fn percent_end_marker() {
        let instance = parse("p cnf 2 2\n1 0\n-2 0\n%\n0\nleftover garbage").unwrap();
        assert_eq!(instance.clauses().len(), 2);
    }

    #[test]
    fn empty_clause_line() {
        let instance = parse("p cnf 2 2\n0\n1 2 0\n").unwrap();
        assert_eq!(instance.clauses(), &[vec![], vec![1, 2]]);
    }

    #[test]
    fn missing_header() {
        assert!(matches!(parse("1 2 0\n"), Err(Error::MissingHeader)));
        assert!(matches!(parse(""), Err(Error::MissingHeader)));
    }

    #[test]
    fn malformed_header() {
        assert!(matches!(parse("p cnf x 2\n"), Err(Error::BadHeader(_))));
        assert!(matches!(parse("p sat 2 2\n"), Err(Error::BadHeader(_))));
    }

    #[test]
    fn malformed_literal() {
        assert!(matches!(
            parse("p cnf 2 1\n1 abc 0\n"),
            Err(Error::BadLiteral(token)) if token == "abc"
        ));
    }

    #[test]
    fn literal_out_of_range() {
        assert!(matches!(
            parse("p cnf 2 1\n1 3 0\n"),
            Err(Error::LiteralOutOfRange { literal: 3, num_vars: 2 })
        ));
    }

    #[test]
    fn too_few_clauses() {
        assert!(matches!(
            parse("p cnf 2 3\n1 0\n2 0\n"),
            Err(Error::MissingClauses { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn unterminated_clause() {
        assert!(matches!(
            parse("p cnf 2 1\n1 2\n"),
            Err(Error::UnterminatedClause)
        ));
    }

    #[test]
    fn extra_clauses_beyond_the_header_are_ignored() {
        let instance = parse("p cnf 2 1\n1 0\n2 0\n").unwrap();
        assert_eq!(instance.clauses().len(), 1);
    }
}
