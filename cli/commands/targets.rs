use super::*;
use crate::flags::Flags;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "targets",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "List every target declared in this workspace"
)]
pub struct TargetsCommand {
    #[structopt(flatten)]
    flags: Flags,
}

impl TargetsCommand {
    pub async fn run(self) -> i32 {
        let outcome = match check_workspace(self.flags.into()).await {
            Ok(outcome) => outcome,
            Err(code) => return code,
        };

        for id in outcome.registry().target_ids() {
            println!("{}", outcome.registry().get_label(id));
        }
        exit_code::OK
    }
}
