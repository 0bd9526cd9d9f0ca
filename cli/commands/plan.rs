use super::*;
use crate::flags::Flags;
use quarry_core::{Label, PlanningFlow};
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "plan",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Print the order in which this workspace's targets should be built"
)]
pub struct PlanCommand {
    #[structopt(help = r"The target to plan.

A label like //gensupport:gensupport. When omitted, the whole
workspace is planned. Targets with no dependencies between them
land in the same batch and can be built concurrently.
")]
    target: Option<String>,

    #[structopt(flatten)]
    flags: Flags,
}

impl PlanCommand {
    pub async fn run(self) -> i32 {
        let target: Option<Label> = match &self.target {
            None => None,
            Some(raw) => match raw.parse() {
                Ok(label) => Some(label),
                Err(err) => {
                    eprintln!("error: {}", err);
                    return exit_code::ARGUMENT_ERROR;
                }
            },
        };

        let outcome = match check_workspace(self.flags.into()).await {
            Ok(outcome) => outcome,
            Err(code) => return code,
        };

        if outcome.report().blocks_planning() {
            print_diagnostics(&outcome);
            eprintln!("FAILED: cannot plan a build until these are fixed.");
            return exit_code::VALIDATION_ERROR;
        }

        let planner = outcome.planner();
        let flow = match &target {
            None => planner.plan(),
            Some(label) => planner.plan_target(label),
        };

        let plan = match flow {
            PlanningFlow::Planned { plan } => plan,
            PlanningFlow::MissingTarget { target } => {
                eprintln!("error: no target named {} is declared in this workspace", target);
                return exit_code::VALIDATION_ERROR;
            }
            PlanningFlow::CyclicDependency { members } => {
                let members: Vec<String> = members.iter().map(|l| l.to_string()).collect();
                eprintln!("error: dependency cycle between: {}", members.join(", "));
                return exit_code::VALIDATION_ERROR;
            }
        };

        for (idx, batch) in plan.batches().iter().enumerate() {
            println!("Batch {}:", idx + 1);
            for label in batch {
                println!("  {}", label);
            }
        }

        exit_code::OK
    }
}
