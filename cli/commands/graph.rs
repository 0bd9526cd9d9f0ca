use super::*;
use crate::flags::Flags;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "graph",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Print the dependency graph of this workspace in graphviz dot format"
)]
pub struct GraphCommand {
    #[structopt(flatten)]
    flags: Flags,
}

impl GraphCommand {
    pub async fn run(self) -> i32 {
        let outcome = match check_workspace(self.flags.into()).await {
            Ok(outcome) => outcome,
            Err(code) => return code,
        };

        print!("{}", outcome.graph().to_dot());
        exit_code::OK
    }
}
