use super::*;
use crate::flags::Flags;
use structopt::StructOpt;
use tracing::*;

#[derive(StructOpt, Debug, Clone, Default)]
#[structopt(
    name = "check",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Validate every build manifest in this workspace"
)]
pub struct CheckCommand {
    #[structopt(flatten)]
    flags: Flags,
}

impl CheckCommand {
    pub async fn run(self) -> i32 {
        let outcome = match check_workspace(self.flags.into()).await {
            Ok(outcome) => outcome,
            Err(code) => return code,
        };

        debug!(
            "workspace {} declares {} targets",
            outcome.workspace().name(),
            outcome.registry().len()
        );

        if outcome.report().is_clean() {
            println!(
                "OK: {} targets across workspace {}, no issues found.",
                outcome.registry().len(),
                outcome.workspace().name()
            );
            return exit_code::OK;
        }

        print_diagnostics(&outcome);
        eprintln!(
            "FAILED: {} issues across {} targets.",
            outcome.report().len(),
            outcome.registry().len()
        );
        exit_code::VALIDATION_ERROR
    }
}
