pub mod cli;
pub mod command;
pub mod config;
pub mod executor;
pub mod history;
pub mod logger;
pub mod manifest;
pub mod outcome;
pub mod reporter;
pub mod runner;
pub mod scheduler;

pub use cli::Cli;
pub use command::{BuildCommand, ToolCommands};
pub use config::Config;
pub use executor::{execute_command, ExecutionResult};
pub use history::{RunHistory, RunRecord};
pub use manifest::{Directive, Manifest, ManifestError, ParseError, Step, Target, Tool};
pub use outcome::{Outcome, RunSummary, TargetOutcome, TargetStatus};
pub use reporter::Reporter;
pub use runner::{BuildFailure, BuildJob, CommandRunner, ProcessRunner, RunResult};
pub use scheduler::{RunConfig, RunEvent, Scheduler};
