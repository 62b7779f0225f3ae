// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline state machine
//!
//! ```text
//! Idle → Uploading → Transforming → Synthesizing → Persisting → Persisted
//!   └──────┴─────────────┴──────────────┴─────────────┴──────→ Failed
//! ```

use std::fmt;

/// Stage of a single submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Uploading,
    Transforming,
    Synthesizing,
    Persisting,
    Persisted,
    Failed,
}

impl PipelineState {
    /// A submission is running
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            PipelineState::Uploading
                | PipelineState::Transforming
                | PipelineState::Synthesizing
                | PipelineState::Persisting
        )
    }

    /// The last submission has finished, one way or the other
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Persisted | PipelineState::Failed)
    }

    /// Whether `next` directly follows `self`
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (*self, next) {
            (Idle, Uploading)
            | (Uploading, Transforming)
            | (Transforming, Synthesizing)
            | (Synthesizing, Persisting)
            | (Persisting, Persisted) => true,
            // Input rejected before anything was sent
            (Idle, Failed) => true,
            (from, Failed) => from.is_in_progress(),
            (from, Idle) => from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Uploading => "uploading",
            PipelineState::Transforming => "transforming",
            PipelineState::Synthesizing => "synthesizing",
            PipelineState::Persisting => "persisting",
            PipelineState::Persisted => "persisted",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineState::*;
    use super::*;

    const ALL: [PipelineState; 7] = [
        Idle,
        Uploading,
        Transforming,
        Synthesizing,
        Persisting,
        Persisted,
        Failed,
    ];

    #[test]
    fn test_success_path_is_linear() {
        let path = [Idle, Uploading, Transforming, Synthesizing, Persisting, Persisted];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_no_skipping_or_looping() {
        assert!(!Idle.can_transition_to(Transforming));
        assert!(!Uploading.can_transition_to(Synthesizing));
        assert!(!Transforming.can_transition_to(Uploading));
        assert!(!Persisted.can_transition_to(Uploading));
        assert!(!Failed.can_transition_to(Persisted));
    }

    #[test]
    fn test_failed_reachable_from_in_progress() {
        for state in ALL.iter().filter(|s| s.is_in_progress()) {
            assert!(state.can_transition_to(Failed));
        }
        assert!(!Persisted.can_transition_to(Failed));
    }

    #[test]
    fn test_only_terminal_states_reset() {
        for state in ALL {
            assert_eq!(state.can_transition_to(Idle), state.is_terminal());
        }
    }
}
