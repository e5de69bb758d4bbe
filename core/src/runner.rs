use std::future::Future;
use thiserror::Error;

use crate::command::ToolCommands;
use crate::executor;
use crate::manifest::{Target, Tool};

/// One target to build.
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub target: Target,
    pub tool: Tool,
    pub pull: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct BuildFailure {
    pub reason: String,
    /// Whatever the commands printed before failing.
    pub output: String,
}

impl BuildFailure {
    pub fn new(reason: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            output: output.into(),
        }
    }
}

pub type RunResult = Result<String, BuildFailure>;

/// Builds a single target. Pass/fail is decided by the external commands'
/// exit status alone.
pub trait CommandRunner: Send + Sync + 'static {
    fn run(&self, job: BuildJob) -> impl Future<Output = RunResult> + Send;
}

/// Runs the configured tool commands as child processes in the target directory.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    commands: ToolCommands,
}

impl ProcessRunner {
    pub fn new(commands: ToolCommands) -> Self {
        Self { commands }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, job: BuildJob) -> impl Future<Output = RunResult> + Send {
        let sequence = self.commands.sequence(job.tool, job.pull);

        async move {
            let mut output: Vec<String> = Vec::new();

            for command in &sequence {
                match executor::execute_command(command, &job.target.dir).await {
                    Ok(result) => {
                        output.extend(result.output);
                        if !result.success {
                            let reason = result
                                .failure_reason
                                .unwrap_or_else(|| format!("{} failed", command));
                            return Err(BuildFailure::new(reason, output.join("\n")));
                        }
                    }
                    Err(err) => {
                        return Err(BuildFailure::new(format!("{:#}", err), output.join("\n")));
                    }
                }
            }

            Ok(output.join("\n"))
        }
    }
}
