use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::scheduler::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "loaf")]
#[command(author, version, about = "Build Gradle and Maven projects listed in a manifest", long_about = None)]
pub struct Cli {
    #[arg(
        value_name = "MANIFEST",
        required_unless_present = "history",
        help = "Manifest file listing the projects to build"
    )]
    pub manifest: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = 0,
        help = "Skip the first N targets of the manifest"
    )]
    pub skip: usize,

    #[arg(short, long, help = "Print build output for every target")]
    pub verbose: bool,

    #[arg(short, long, help = "Print build output for failed targets")]
    pub errors: bool,

    #[arg(
        short,
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum number of builds running at once within a step"
    )]
    pub jobs: Option<u32>,

    #[arg(long, value_name = "PATH", help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "COUNT",
        num_args = 0..=1,
        default_missing_value = "10",
        help = "Show recent runs and exit"
    )]
    pub history: Option<usize>,

    #[arg(long, help = "Do not record this run in the history")]
    pub no_history: bool,
}

impl Cli {
    /// Combines flags, configuration and the manifest's `pull` directive.
    pub fn run_config(&self, config: &Config, pull: bool) -> RunConfig {
        RunConfig {
            skip: self.skip,
            verbose: self.verbose,
            show_errors: self.errors,
            pull,
            max_concurrent: self
                .jobs
                .map(|jobs| jobs as usize)
                .or(config.scheduler.max_concurrent),
        }
    }
}
