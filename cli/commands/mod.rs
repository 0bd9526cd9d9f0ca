mod check;
mod graph;
mod plan;
mod targets;

pub use check::*;
pub use graph::*;
pub use plan::*;
pub use targets::*;

pub(crate) use crate::exit_code;
use quarry_core::{CheckOutcome, Checker, Config};

/// Run the full check pipeline, mapping load failures to an exit code.
///
pub(crate) async fn check_workspace(config: Config) -> Result<CheckOutcome, i32> {
    match Checker::new(config).check().await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            eprintln!("error: {}", err);
            Err(exit_code::LOAD_ERROR)
        }
    }
}

pub(crate) fn print_diagnostics(outcome: &CheckOutcome) {
    for diagnostic in outcome.report().diagnostics() {
        eprintln!("error: {}", diagnostic);
    }
}
