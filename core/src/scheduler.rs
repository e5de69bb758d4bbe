use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

use crate::manifest::{Manifest, Target, Tool};
use crate::outcome::{Outcome, RunSummary, TargetOutcome};
use crate::runner::{BuildFailure, BuildJob, CommandRunner};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of leading targets, counted across the whole manifest, to skip.
    pub skip: usize,
    pub verbose: bool,
    pub show_errors: bool,
    pub pull: bool,
    /// Cap on concurrently running builds within a batch step.
    pub max_concurrent: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum RunEvent {
    StepStarted {
        step: usize,
        tool: Tool,
        batch: bool,
        targets: Vec<(usize, Target)>,
    },
    TargetSkipped {
        position: usize,
        target: Target,
        batch: bool,
    },
    TargetStarted {
        position: usize,
        target: Target,
        batch: bool,
    },
    TargetFinished {
        outcome: TargetOutcome,
        batch: bool,
    },
    StepFinished {
        step: usize,
        batch: bool,
    },
    RunFinished {
        elapsed: Duration,
        summary: RunSummary,
    },
}

enum Slot {
    Done(TargetOutcome),
    Running {
        position: usize,
        target: Target,
        handle: JoinHandle<TargetOutcome>,
    },
}

pub struct Scheduler<R: CommandRunner> {
    runner: Arc<R>,
    config: RunConfig,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl<R: CommandRunner> Scheduler<R> {
    pub fn new(runner: R, config: RunConfig) -> Self {
        Self {
            runner: Arc::new(runner),
            config,
            events: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: RunEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    /// Runs every step in order and returns one outcome per target, in
    /// manifest order. Build failures never abort the run.
    pub async fn run(&self, manifest: &Manifest) -> Vec<TargetOutcome> {
        let start = Instant::now();
        let semaphore = self
            .config
            .max_concurrent
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        let mut outcomes = Vec::with_capacity(manifest.target_count());
        let mut cursor = 0;

        for (step_index, step) in manifest.steps.iter().enumerate() {
            let batch = step.is_batch();

            self.emit(RunEvent::StepStarted {
                step: step_index,
                tool: step.tool,
                batch,
                targets: step
                    .targets
                    .iter()
                    .enumerate()
                    .map(|(i, target)| (cursor + i + 1, target.clone()))
                    .collect(),
            });

            let mut slots = Vec::with_capacity(step.targets.len());

            for target in &step.targets {
                cursor += 1;

                if cursor <= self.config.skip {
                    self.emit(RunEvent::TargetSkipped {
                        position: cursor,
                        target: target.clone(),
                        batch,
                    });
                    slots.push(Slot::Done(TargetOutcome {
                        position: cursor,
                        step: step_index,
                        target: target.clone(),
                        outcome: Outcome::Skipped,
                    }));
                    continue;
                }

                let job = BuildJob {
                    target: target.clone(),
                    tool: step.tool,
                    pull: self.config.pull,
                };
                let handle = self.launch(job, cursor, step_index, batch, semaphore.clone());
                slots.push(Slot::Running {
                    position: cursor,
                    target: target.clone(),
                    handle,
                });
            }

            for slot in slots {
                let outcome = match slot {
                    Slot::Done(outcome) => outcome,
                    Slot::Running {
                        position,
                        target,
                        handle,
                    } => match handle.await {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            let outcome = TargetOutcome {
                                position,
                                step: step_index,
                                target,
                                outcome: Outcome::Failed {
                                    error: BuildFailure::new(
                                        format!("build task aborted: {}", err),
                                        "",
                                    ),
                                    elapsed: Duration::ZERO,
                                },
                            };
                            self.emit(RunEvent::TargetFinished {
                                outcome: outcome.clone(),
                                batch,
                            });
                            outcome
                        }
                    },
                };
                outcomes.push(outcome);
            }

            self.emit(RunEvent::StepFinished {
                step: step_index,
                batch,
            });
        }

        self.emit(RunEvent::RunFinished {
            elapsed: start.elapsed(),
            summary: RunSummary::from_outcomes(&outcomes),
        });

        outcomes
    }

    fn launch(
        &self,
        job: BuildJob,
        position: usize,
        step: usize,
        batch: bool,
        semaphore: Option<Arc<Semaphore>>,
    ) -> JoinHandle<TargetOutcome> {
        let runner = Arc::clone(&self.runner);
        let events = self.events.clone();

        tokio::spawn(async move {
            let _permit = match semaphore {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let target = job.target.clone();
            if let Some(events) = &events {
                let _ = events.send(RunEvent::TargetStarted {
                    position,
                    target: target.clone(),
                    batch,
                });
            }

            let started = Instant::now();
            let result = runner.run(job).await;
            let elapsed = started.elapsed();

            let outcome = TargetOutcome {
                position,
                step,
                target,
                outcome: match result {
                    Ok(output) => Outcome::Succeeded { output, elapsed },
                    Err(error) => Outcome::Failed { error, elapsed },
                },
            };

            if let Some(events) = &events {
                let _ = events.send(RunEvent::TargetFinished {
                    outcome: outcome.clone(),
                    batch,
                });
            }

            outcome
        })
    }
}
