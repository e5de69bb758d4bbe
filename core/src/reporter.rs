use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::logger::{LogLevel, Logger};
use crate::outcome::Outcome;
use crate::scheduler::RunEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Status(LogLevel, String),
    Output(String),
}

/// Turns scheduler events into console lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbose: bool,
    show_errors: bool,
}

impl Reporter {
    pub fn new(verbose: bool, show_errors: bool) -> Self {
        Self {
            verbose,
            show_errors,
        }
    }

    pub fn render(&self, event: &RunEvent) -> Vec<ReportLine> {
        let mut lines = Vec::new();

        match event {
            RunEvent::StepStarted { batch, targets, .. } => {
                if *batch {
                    let positions: Vec<String> =
                        targets.iter().map(|(p, _)| p.to_string()).collect();
                    let paths: Vec<&str> = targets.iter().map(|(_, t)| t.path.as_str()).collect();
                    lines.push(progress(format!(
                        "{}. Building Multiple: {}...",
                        positions.join(", "),
                        paths.join(", ")
                    )));
                }
            }
            RunEvent::TargetSkipped {
                position,
                target,
                batch,
            } => {
                if *batch {
                    lines.push(progress(format!("-> {} skipped!", target)));
                } else {
                    lines.push(progress(format!("{}. Skipped {}.", position, target)));
                }
            }
            RunEvent::TargetStarted {
                position,
                target,
                batch,
            } => {
                if !*batch {
                    lines.push(progress(format!("{}. Building {}...", position, target)));
                }
            }
            RunEvent::TargetFinished { outcome, batch } => {
                let target = &outcome.target;
                match &outcome.outcome {
                    Outcome::Succeeded { output, elapsed } => {
                        if self.verbose {
                            lines.push(ReportLine::Output(output.clone()));
                        }
                        let ms = elapsed.as_millis();
                        let message = if *batch {
                            format!("-> {} built! ({} ms)", target, ms)
                        } else {
                            format!("-> Built! ({} ms)", ms)
                        };
                        lines.push(ReportLine::Status(LogLevel::Success, message));
                    }
                    Outcome::Failed { error, elapsed } => {
                        if self.verbose || self.show_errors {
                            lines.push(ReportLine::Output(error.output.clone()));
                            lines.push(ReportLine::Status(
                                LogLevel::Error,
                                format!("error: {}", error.reason),
                            ));
                        }
                        let ms = elapsed.as_millis();
                        let message = if *batch {
                            format!("-> {} failed! ({} ms)", target, ms)
                        } else {
                            format!("-> Failed! ({} ms)", ms)
                        };
                        lines.push(ReportLine::Status(LogLevel::Error, message));
                    }
                    Outcome::Skipped => {}
                }
                if !*batch {
                    lines.push(blank());
                }
            }
            RunEvent::StepFinished { batch, .. } => {
                if *batch {
                    lines.push(blank());
                }
            }
            RunEvent::RunFinished { elapsed, summary } => {
                lines.push(ReportLine::Status(
                    LogLevel::Success,
                    format!(
                        "Finished all after {} seconds!",
                        elapsed.as_millis() as f64 / 1000.0
                    ),
                ));
                if let Some(skip) = summary.resume_from {
                    lines.push(ReportLine::Status(
                        LogLevel::Warning,
                        format!(
                            "{} of {} builds failed. Resume with --skip {}",
                            summary.failed,
                            summary.failed + summary.succeeded,
                            skip
                        ),
                    ));
                }
            }
        }

        lines
    }

    /// Drains `events` until the sender side closes, printing each line.
    pub fn spawn(
        self,
        mut events: mpsc::UnboundedReceiver<RunEvent>,
        logger: Logger,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                for line in self.render(&event) {
                    match line {
                        ReportLine::Status(level, message) => logger.log(level, &message),
                        ReportLine::Output(output) => logger.log_output(&output),
                    }
                }
            }
        })
    }
}

fn progress(message: String) -> ReportLine {
    ReportLine::Status(LogLevel::Progress, message)
}

fn blank() -> ReportLine {
    ReportLine::Status(LogLevel::Info, String::new())
}
