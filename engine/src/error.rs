use thiserror::Error;

use crate::battle::Phase;

pub type BattleResult<T> = Result<T, BattleError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    /// Roster was empty or carried duplicate ids.
    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    /// An operation was called from a phase the transition table forbids.
    #[error("`{operation}` is not allowed while {phase}")]
    PreconditionViolation {
        operation: &'static str,
        phase: Phase,
    },

    /// The living set emptied without a winner. The battle has been
    /// finalized with no winner.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("speed multiplier must be a positive finite number, got {0}")]
    InvalidSpeed(f64),
}

impl BattleError {
    pub(crate) fn precondition(operation: &'static str, phase: Phase) -> Self {
        Self::PreconditionViolation { operation, phase }
    }
}
