use quarry_core::Config;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Default, Debug, Clone, StructOpt)]
pub struct Flags {
    #[structopt(
        help = r"Run as if quarry had been started in this directory.",
        long = "invocation-dir"
    )]
    pub(crate) invocation_dir: Option<PathBuf>,

    #[structopt(
        help = r"The uppermost directory in which to search for the workspace file.",
        long = "search-stop-path"
    )]
    pub(crate) search_stop_path: Option<PathBuf>,
}

impl From<Flags> for Config {
    fn from(flags: Flags) -> Self {
        let mut config = Config::builder();

        if let Some(dir) = flags.invocation_dir {
            config.invocation_dir(dir);
        }
        if let Some(path) = flags.search_stop_path {
            config.search_stop_path(path);
        }

        config.build().unwrap()
    }
}
