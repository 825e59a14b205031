//! Command-line front end: parse a DIMACS file, decide it, report.

use clap::{Parser, ValueEnum};
use resin::dpll::Dpll;
use resin::formula::Formula;
use resin::literal::PackedLiteral;
use resin::solver::{Stats, Status};
use resin::{dimacs, Error};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Conflict-driven clause learning.
    Cdcl,
    /// Plain backtracking search; exponentially slower, useful as a
    /// cross-check.
    Dpll,
}

#[derive(Parser, Debug)]
#[command(name = "resin", version, about = "A CDCL SAT solver for DIMACS CNF files")]
struct Cli {
    /// Path to a DIMACS .cnf file.
    path: PathBuf,

    /// Print the satisfying assignment when the instance is satisfiable.
    #[arg(short, long)]
    model: bool,

    /// Suppress the statistics summary.
    #[arg(long)]
    no_stats: bool,

    /// Re-check the model against every input clause before reporting.
    #[arg(long)]
    verify: bool,

    /// Search algorithm to run.
    #[arg(long, value_enum, default_value = "cdcl")]
    algorithm: Algorithm,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let mut instance = dimacs::parse_file(&cli.path)?;

    let (status, model, stats): (Status, Option<Vec<bool>>, Stats) = match cli.algorithm {
        Algorithm::Cdcl => {
            let status = instance.check();
            (
                status,
                instance.model().map(<[bool]>::to_vec),
                *instance.stats(),
            )
        }
        Algorithm::Dpll => {
            let formula: Formula<PackedLiteral> =
                Formula::new(instance.num_vars(), instance.clauses().to_vec());
            let mut dpll = Dpll::new(formula);
            let status = dpll.check();
            let model = (status == Status::Sat).then(|| dpll.model());
            (status, model, dpll.stats())
        }
    };

    match status {
        Status::Sat => println!("s SATISFIABLE"),
        Status::Unsat => println!("s UNSATISFIABLE"),
        Status::Unknown => println!("s UNKNOWN"),
    }

    if let Some(model) = &model {
        if cli.verify && !instance.verify(model) {
            eprintln!("error: model fails verification");
            return Ok(ExitCode::FAILURE);
        }
        if cli.model {
            let mut line = String::from("v");
            for (var, &value) in model.iter().enumerate().skip(1) {
                line.push(' ');
                if !value {
                    line.push('-');
                }
                line.push_str(&var.to_string());
            }
            line.push_str(" 0");
            println!("{line}");
        }
    }

    if !cli.no_stats {
        println!("{stats}");
    }

    Ok(ExitCode::SUCCESS)
}
