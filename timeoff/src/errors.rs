//! Error types for the time-off core.
//!
//! - [`RuleViolation`]: a command is not legal in the current state. These
//!   are permanent; retrying the same command against the same history gives
//!   the same answer.
//! - [`CommandError`]: everything a command can fail with end to end,
//!   wrapping rule violations and store failures.

use std::fmt;

use thiserror::Error;
use timeoff_types::EventStoreError;

use crate::types::{RequestId, UserId};

/// Lifecycle move a state-bound command attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Manager approval.
    Validate,
    /// Manager cancellation of an active request.
    Cancel,
    /// Granting an employee's withdrawal.
    AcceptCancellation,
    /// Denying an employee's withdrawal.
    RefuseCancellation,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => write!(f, "validated"),
            Self::Cancel => write!(f, "cancelled"),
            Self::AcceptCancellation => write!(f, "granted cancellation"),
            Self::RefuseCancellation => write!(f, "refused cancellation"),
        }
    }
}

/// Why a command was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The request collides with another request of the same employee.
    #[error("request overlaps existing request {request_id}")]
    OverlappingRequest {
        /// The existing request it collides with.
        request_id: RequestId,
    },

    /// The request starts today or earlier.
    #[error("request {request_id} starts in the past")]
    StartsInPast {
        /// Offending request.
        request_id: RequestId,
    },

    /// Cancellation was asked for a request that has not started.
    #[error("request {request_id} starts in the future")]
    StartsInFuture {
        /// Offending request.
        request_id: RequestId,
    },

    /// The request's current state does not allow the move.
    #[error("request in state {state} cannot be {attempted}")]
    InvalidTransition {
        /// Name of the state the request was in.
        state: &'static str,
        /// What the command tried to do.
        attempted: Transition,
    },
}

/// Failure of a command, from decision to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A rule rejected the command; nothing was written.
    #[error("command rejected: {0}")]
    Rejected(#[from] RuleViolation),

    /// The event store failed.
    #[error("event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Other writers kept changing the stream until retries ran out.
    #[error("concurrency conflict on stream {user_id} after {attempts} attempts")]
    ConcurrencyConflict {
        /// Owner of the contended stream.
        user_id: UserId,
        /// Attempts made, the first one included.
        attempts: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_reads_as_a_sentence() {
        let violation = RuleViolation::InvalidTransition {
            state: "Validated",
            attempted: Transition::Validate,
        };

        assert_eq!(
            violation.to_string(),
            "request in state Validated cannot be validated"
        );
    }

    #[test]
    fn rule_violations_convert_into_rejections() {
        let violation = RuleViolation::StartsInPast {
            request_id: RequestId::generate(),
        };

        let error: CommandError = violation.into();

        assert_eq!(error, CommandError::Rejected(violation));
    }

    #[test]
    fn store_errors_convert_into_command_errors() {
        let error: CommandError = EventStoreError::VersionConflict.into();

        assert_eq!(
            error.to_string(),
            "event store error: version conflict detected"
        );
    }
}
