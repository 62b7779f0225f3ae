// SPDX-License-Identifier: GPL-3.0-only

//! Progress reporting side-channel
//!
//! Observers get a percentage and a short status phrase at every stage
//! boundary, or a single failure observation when the submission aborts.
//! Nothing in the pipeline depends on whether anyone is listening.

use super::PipelineState;
use crate::constants::progress as phrases;
use std::fmt;

/// One progress observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Step {
        percent: u8,
        stage: PipelineState,
        message: &'static str,
    },
    Failed {
        message: &'static str,
        error: String,
    },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Step {
                percent, message, ..
            } => write!(f, "[{:>3}%] {}", percent, message),
            Progress::Failed { message, error } => write!(f, "{}: {}", message, error),
        }
    }
}

/// Stage boundaries, in emission order
pub(crate) mod steps {
    use super::PipelineState;
    use super::phrases;

    pub type Step = (u8, PipelineState, &'static str);

    pub const RECEIVED: Step = (10, PipelineState::Idle, phrases::RECEIVED);
    pub const UPLOADING: Step = (25, PipelineState::Uploading, phrases::UPLOADING);
    pub const ANALYZING: Step = (40, PipelineState::Transforming, phrases::ANALYZING);
    pub const TRANSFORMING: Step = (60, PipelineState::Transforming, phrases::TRANSFORMING);
    pub const FINALIZING: Step = (80, PipelineState::Synthesizing, phrases::FINALIZING);
    pub const COMPLETE: Step = (100, PipelineState::Persisted, phrases::COMPLETE);
}

/// Wraps an observer and keeps its percentages non-decreasing
pub(crate) struct ProgressTracker<F> {
    observer: F,
    last_percent: u8,
    finished: bool,
}

impl<F> ProgressTracker<F>
where
    F: FnMut(Progress) + Send,
{
    pub(crate) fn new(observer: F) -> Self {
        Self {
            observer,
            last_percent: 0,
            finished: false,
        }
    }

    pub(crate) fn step(&mut self, (percent, stage, message): steps::Step) {
        if self.finished {
            return;
        }
        self.last_percent = self.last_percent.max(percent.min(100));
        if self.last_percent == 100 {
            self.finished = true;
        }
        (self.observer)(Progress::Step {
            percent: self.last_percent,
            stage,
            message,
        });
    }

    pub(crate) fn fail(&mut self, error: &dyn std::error::Error) {
        if self.finished {
            return;
        }
        self.finished = true;
        (self.observer)(Progress::Failed {
            message: phrases::FAILED,
            error: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PipelineError;

    #[test]
    fn test_percent_never_decreases() {
        let mut seen = Vec::new();
        let mut tracker = ProgressTracker::new(|p| seen.push(p));
        tracker.step(steps::TRANSFORMING);
        tracker.step(steps::UPLOADING);
        drop(tracker);

        let percents: Vec<u8> = seen
            .iter()
            .filter_map(|p| match p {
                Progress::Step { percent, .. } => Some(*percent),
                Progress::Failed { .. } => None,
            })
            .collect();
        assert_eq!(percents, vec![60, 60]);
    }

    #[test]
    fn test_failure_is_final() {
        let mut seen = Vec::new();
        let mut tracker = ProgressTracker::new(|p| seen.push(p));
        tracker.step(steps::RECEIVED);
        tracker.fail(&PipelineError::InvalidInput("empty".into()));
        tracker.step(steps::COMPLETE);
        tracker.fail(&PipelineError::InvalidInput("again".into()));
        drop(tracker);

        assert_eq!(seen.len(), 2);
        assert!(matches!(
            &seen[1],
            Progress::Failed { message, .. } if *message == phrases::FAILED
        ));
    }

    #[test]
    fn test_display() {
        let step = Progress::Step {
            percent: 25,
            stage: PipelineState::Uploading,
            message: phrases::UPLOADING,
        };
        assert_eq!(step.to_string(), "[ 25%] UPLOADING TO SECURE SERVERS");
    }
}
