mod commands;
pub mod flags;

use commands::*;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "quarry",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "A manifest linter and build planner for vendored source trees"
)]
struct Quarry {
    #[structopt(subcommand, help = "the command to run")]
    cmd: Option<Command>,
}

impl Quarry {
    async fn run(mut self) -> i32 {
        human_panic::setup_panic!(Metadata {
            name: "quarry".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            authors: "the quarry maintainers".into(),
            homepage: "".into(),
        });

        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .format_timestamp_micros()
            .format_module_path(false)
            .parse_env("QUARRY_LOG")
            .try_init()
            .unwrap();

        self.cmd
            .take()
            .unwrap_or_else(|| Command::Check(CheckCommand::default()))
            .run()
            .await
    }
}

#[derive(StructOpt, Debug, Clone)]
enum Command {
    Check(CheckCommand),
    Plan(PlanCommand),
    Graph(GraphCommand),
    Targets(TargetsCommand),
}

impl Command {
    async fn run(self) -> i32 {
        match self {
            Command::Check(x) => x.run().await,
            Command::Graph(x) => x.run().await,
            Command::Plan(x) => x.run().await,
            Command::Targets(x) => x.run().await,
        }
    }
}

/// Process exit codes: 2 for validation errors, 3 for IO errors, 4 for argument errors, so that
/// supervising scripts can tell a dirty manifest from a broken invocation.
///
pub(crate) mod exit_code {
    pub const OK: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const LOAD_ERROR: i32 = 3;
    pub const ARGUMENT_ERROR: i32 = 4;
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let quarry = match Quarry::from_args_safe() {
        Ok(quarry) => quarry,
        Err(err) if err.use_stderr() => {
            eprintln!("{}", err.message);
            std::process::exit(exit_code::ARGUMENT_ERROR);
        }
        // --help and --version land here and exit 0.
        Err(err) => err.exit(),
    };

    std::process::exit(quarry.run().await)
}
