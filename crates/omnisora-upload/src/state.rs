//! Attempt state machine.
//!
//! ```text
//! Idle → SelectingFile → StrategyChosen(Small) → Transferring → Done
//!                      → StrategyChosen(Large) → Digesting → Authorizing
//!                                              → Transferring → Finalizing → Done
//! ```
//!
//! Any non-terminal state may move to `Failed`. `Done` and `Failed` end the attempt;
//! only [`AttemptStateMachine::reset`] leaves them. A state is never re-entered
//! within one attempt.

use std::fmt;

use omnisora_core::UploadError;

use crate::strategy::UploadStrategy;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttemptState {
    #[default]
    Idle,
    SelectingFile,
    StrategyChosen(UploadStrategy),
    Digesting,
    Authorizing,
    Transferring,
    Finalizing,
    Done,
    /// Terminal failure with the user-visible reason.
    Failed(String),
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Done | AttemptState::Failed(_))
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptState::Idle => f.write_str("IDLE"),
            AttemptState::SelectingFile => f.write_str("SELECTING_FILE"),
            AttemptState::StrategyChosen(s) => write!(f, "STRATEGY_CHOSEN({})", s),
            AttemptState::Digesting => f.write_str("DIGESTING"),
            AttemptState::Authorizing => f.write_str("AUTHORIZING"),
            AttemptState::Transferring => f.write_str("TRANSFERRING"),
            AttemptState::Finalizing => f.write_str("FINALIZING"),
            AttemptState::Done => f.write_str("DONE"),
            AttemptState::Failed(reason) => write!(f, "FAILED({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid upload state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: AttemptState,
    pub to: AttemptState,
}

impl From<InvalidTransition> for UploadError {
    fn from(err: InvalidTransition) -> Self {
        UploadError::InvalidInput(err.to_string())
    }
}

/// Current state plus the strategy chosen for this attempt.
#[derive(Debug, Clone, Default)]
pub struct AttemptStateMachine {
    state: AttemptState,
    strategy: Option<UploadStrategy>,
}

impl AttemptStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    pub fn strategy(&self) -> Option<UploadStrategy> {
        self.strategy
    }

    fn allows(&self, next: &AttemptState) -> bool {
        use AttemptState::*;

        match (&self.state, next) {
            (Done | Failed(_), _) => false,
            (_, Failed(_)) => true,
            (Idle, SelectingFile) => true,
            (SelectingFile, StrategyChosen(_)) => true,
            (StrategyChosen(UploadStrategy::Small), Transferring) => true,
            (StrategyChosen(UploadStrategy::Large), Digesting) => true,
            (Digesting, Authorizing) => true,
            (Authorizing, Transferring) => true,
            (Transferring, Done) => self.strategy == Some(UploadStrategy::Small),
            (Transferring, Finalizing) => self.strategy == Some(UploadStrategy::Large),
            (Finalizing, Done) => true,
            _ => false,
        }
    }

    /// Move to `next` if the edge exists.
    pub fn transition(&mut self, next: AttemptState) -> Result<(), InvalidTransition> {
        if !self.allows(&next) {
            return Err(InvalidTransition {
                from: self.state.clone(),
                to: next,
            });
        }
        if let AttemptState::StrategyChosen(strategy) = next {
            self.strategy = Some(strategy);
        }
        self.state = next;
        Ok(())
    }

    /// Fail the attempt unless it already ended. Returns whether the state changed.
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = AttemptState::Failed(reason.into());
        true
    }

    /// Discard the finished attempt and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = AttemptState::Idle;
        self.strategy = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(machine: &mut AttemptStateMachine, states: Vec<AttemptState>) {
        for s in states {
            machine.transition(s).unwrap();
        }
    }

    #[test]
    fn small_path() {
        let mut m = AttemptStateMachine::new();
        walk(
            &mut m,
            vec![
                AttemptState::SelectingFile,
                AttemptState::StrategyChosen(UploadStrategy::Small),
                AttemptState::Transferring,
                AttemptState::Done,
            ],
        );
        assert_eq!(m.state(), &AttemptState::Done);
        assert_eq!(m.strategy(), Some(UploadStrategy::Small));
    }

    #[test]
    fn large_path() {
        let mut m = AttemptStateMachine::new();
        walk(
            &mut m,
            vec![
                AttemptState::SelectingFile,
                AttemptState::StrategyChosen(UploadStrategy::Large),
                AttemptState::Digesting,
                AttemptState::Authorizing,
                AttemptState::Transferring,
                AttemptState::Finalizing,
                AttemptState::Done,
            ],
        );
        assert!(m.state().is_terminal());
    }

    #[test]
    fn large_transfer_cannot_skip_finalize() {
        let mut m = AttemptStateMachine::new();
        walk(
            &mut m,
            vec![
                AttemptState::SelectingFile,
                AttemptState::StrategyChosen(UploadStrategy::Large),
                AttemptState::Digesting,
                AttemptState::Authorizing,
                AttemptState::Transferring,
            ],
        );
        let err = m.transition(AttemptState::Done).unwrap_err();
        assert_eq!(err.from, AttemptState::Transferring);
    }

    #[test]
    fn small_path_never_finalizes() {
        let mut m = AttemptStateMachine::new();
        walk(
            &mut m,
            vec![
                AttemptState::SelectingFile,
                AttemptState::StrategyChosen(UploadStrategy::Small),
                AttemptState::Transferring,
            ],
        );
        assert!(m.transition(AttemptState::Finalizing).is_err());
    }

    #[test]
    fn no_reentry() {
        let mut m = AttemptStateMachine::new();
        walk(
            &mut m,
            vec![
                AttemptState::SelectingFile,
                AttemptState::StrategyChosen(UploadStrategy::Large),
                AttemptState::Digesting,
            ],
        );
        assert!(m.transition(AttemptState::Digesting).is_err());
        assert!(m.transition(AttemptState::SelectingFile).is_err());
    }

    #[test]
    fn terminal_states_need_reset() {
        let mut m = AttemptStateMachine::new();
        m.transition(AttemptState::SelectingFile).unwrap();
        assert!(m.fail("quota exceeded"));
        assert_eq!(m.state(), &AttemptState::Failed("quota exceeded".to_string()));

        assert!(!m.fail("again"));
        assert!(m.transition(AttemptState::SelectingFile).is_err());

        m.reset();
        assert_eq!(m.state(), &AttemptState::Idle);
        assert_eq!(m.strategy(), None);
        m.transition(AttemptState::SelectingFile).unwrap();
    }

    #[test]
    fn display_names() {
        assert_eq!(
            AttemptState::StrategyChosen(UploadStrategy::Large).to_string(),
            "STRATEGY_CHOSEN(large)"
        );
        assert_eq!(
            AttemptState::Failed("cancelled".to_string()).to_string(),
            "FAILED(cancelled)"
        );
    }
}
