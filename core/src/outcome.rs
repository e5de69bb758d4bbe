use std::time::Duration;

use crate::manifest::Target;
use crate::runner::BuildFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { output: String, elapsed: Duration },
    Failed { error: BuildFailure, elapsed: Duration },
    Skipped,
}

impl Outcome {
    pub fn status(&self) -> TargetStatus {
        match self {
            Outcome::Succeeded { .. } => TargetStatus::Succeeded,
            Outcome::Failed { .. } => TargetStatus::Failed,
            Outcome::Skipped => TargetStatus::Skipped,
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Outcome::Succeeded { elapsed, .. } | Outcome::Failed { elapsed, .. } => Some(*elapsed),
            Outcome::Skipped => None,
        }
    }

    /// Captured build output, if the target ran.
    pub fn output(&self) -> Option<&str> {
        match self {
            Outcome::Succeeded { output, .. } => Some(output.as_str()),
            Outcome::Failed { error, .. } => Some(error.output.as_str()),
            Outcome::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl TargetStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TargetStatus::Pending | TargetStatus::Running)
    }

    pub fn can_transition_to(&self, next: TargetStatus) -> bool {
        matches!(
            (self, next),
            (TargetStatus::Pending, TargetStatus::Skipped)
                | (TargetStatus::Pending, TargetStatus::Running)
                | (TargetStatus::Running, TargetStatus::Succeeded)
                | (TargetStatus::Running, TargetStatus::Failed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    /// 1-based flattened position across the whole manifest.
    pub position: usize,
    pub step: usize,
    pub target: Target,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Skip count that resumes the run at its first failure.
    pub resume_from: Option<usize>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[TargetOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome.outcome.status() {
                TargetStatus::Succeeded => summary.succeeded += 1,
                TargetStatus::Skipped => summary.skipped += 1,
                TargetStatus::Failed => {
                    summary.failed += 1;
                    if summary.resume_from.is_none() {
                        summary.resume_from = Some(outcome.position - 1);
                    }
                }
                TargetStatus::Pending | TargetStatus::Running => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn outcome(position: usize, outcome: Outcome) -> TargetOutcome {
        TargetOutcome {
            position,
            step: 0,
            target: Target::new("t", Path::new(".")),
            outcome,
        }
    }

    #[test]
    fn test_state_machine() {
        assert!(TargetStatus::Pending.can_transition_to(TargetStatus::Running));
        assert!(TargetStatus::Pending.can_transition_to(TargetStatus::Skipped));
        assert!(TargetStatus::Running.can_transition_to(TargetStatus::Failed));
        assert!(!TargetStatus::Pending.can_transition_to(TargetStatus::Succeeded));
        assert!(!TargetStatus::Failed.can_transition_to(TargetStatus::Running));
        assert!(!TargetStatus::Skipped.can_transition_to(TargetStatus::Running));
        assert!(!TargetStatus::Running.is_terminal());
        assert!(TargetStatus::Succeeded.is_terminal());
    }

    #[test]
    fn test_summary() {
        let ms = Duration::from_millis(5);
        let outcomes = vec![
            outcome(1, Outcome::Skipped),
            outcome(2, Outcome::Succeeded { output: String::new(), elapsed: ms }),
            outcome(3, Outcome::Failed { error: BuildFailure::new("x", ""), elapsed: ms }),
            outcome(4, Outcome::Failed { error: BuildFailure::new("y", ""), elapsed: ms }),
        ];

        let summary = RunSummary::from_outcomes(&outcomes);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.resume_from, Some(2));
    }

    #[test]
    fn test_output_accessors() {
        let failed = Outcome::Failed {
            error: BuildFailure::new("exit 1", "log"),
            elapsed: Duration::from_millis(3),
        };
        assert_eq!(failed.output(), Some("log"));
        assert_eq!(failed.elapsed(), Some(Duration::from_millis(3)));
        assert_eq!(Outcome::Skipped.output(), None);
    }
}
