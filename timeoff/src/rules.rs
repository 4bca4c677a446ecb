//! Decision rules for time-off commands.
//!
//! Each rule looks at the relevant slice of current state and either returns
//! the events the command produces or the reason it is refused. Rules are
//! pure: "today" and the overlap predicate come in through [`RuleContext`].

use chrono::NaiveDate;

use crate::errors::{RuleViolation, Transition};
use crate::event::RequestEvent;
use crate::overlap::OverlapPolicy;
use crate::state::RequestState;
use crate::types::TimeOffRequest;

/// Outcome of a rule.
pub type Decision = Result<Vec<RequestEvent>, RuleViolation>;

/// Inputs a date-sensitive rule needs besides state.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// The date the command is decided on.
    pub today: NaiveDate,
    /// How to detect colliding requests.
    pub overlap: &'a dyn OverlapPolicy,
}

impl<'a> RuleContext<'a> {
    /// Context deciding on `today` with the given overlap policy.
    pub const fn new(today: NaiveDate, overlap: &'a dyn OverlapPolicy) -> Self {
        Self { today, overlap }
    }

    fn check_overlap(
        &self,
        others: &[TimeOffRequest],
        request: &TimeOffRequest,
    ) -> Result<(), RuleViolation> {
        others
            .iter()
            .find(|existing| {
                existing.request_id() != request.request_id()
                    && self.overlap.overlaps(request, existing)
            })
            .map_or(Ok(()), |existing| {
                Err(RuleViolation::OverlappingRequest {
                    request_id: existing.request_id(),
                })
            })
    }

    fn starts_after_today(&self, request: &TimeOffRequest) -> bool {
        request.start().date() > self.today
    }
}

/// An employee asks for time off.
///
/// The request must not overlap an active one and must start strictly after
/// today.
pub fn create_request(
    ctx: &RuleContext<'_>,
    active: &[TimeOffRequest],
    request: &TimeOffRequest,
) -> Decision {
    ctx.check_overlap(active, request)?;

    if !ctx.starts_after_today(request) {
        return Err(RuleViolation::StartsInPast {
            request_id: request.request_id(),
        });
    }

    Ok(vec![RequestEvent::RequestCreated(request.clone())])
}

/// An employee asks to withdraw time off that has already begun.
///
/// Requests starting after today are refused with
/// [`RuleViolation::StartsInFuture`].
pub fn request_cancellation(
    ctx: &RuleContext<'_>,
    active: &[TimeOffRequest],
    request: &TimeOffRequest,
) -> Decision {
    ctx.check_overlap(active, request)?;

    if ctx.starts_after_today(request) {
        return Err(RuleViolation::StartsInFuture {
            request_id: request.request_id(),
        });
    }

    Ok(vec![RequestEvent::CancellationRequested(request.clone())])
}

/// A manager refuses a request that has not started yet.
///
/// Checked against every known request, whatever its state. The request's
/// own state is not consulted, so refusing an already refused request
/// succeeds again as long as the date allows it.
pub fn cancel_request(
    ctx: &RuleContext<'_>,
    all: &[TimeOffRequest],
    request: &TimeOffRequest,
) -> Decision {
    ctx.check_overlap(all, request)?;

    if !ctx.starts_after_today(request) {
        return Err(RuleViolation::StartsInPast {
            request_id: request.request_id(),
        });
    }

    Ok(vec![RequestEvent::RequestRefused(request.clone())])
}

/// A manager approves a request. Only pending requests qualify.
pub fn validate_request(state: &RequestState) -> Decision {
    match state {
        RequestState::PendingValidation(request) => {
            Ok(vec![RequestEvent::RequestValidated(request.clone())])
        }
        other => Err(invalid(other, Transition::Validate)),
    }
}

/// A manager cancels a request that is still active.
pub fn cancel_active_requests(state: &RequestState) -> Decision {
    match state.request() {
        Some(request) if state.is_active() => {
            Ok(vec![RequestEvent::RequestRefused(request.clone())])
        }
        _ => Err(invalid(state, Transition::Cancel)),
    }
}

/// A manager grants a pending withdrawal.
pub fn accept_cancellation(state: &RequestState) -> Decision {
    match state {
        RequestState::ToCancelTimeOffRequested(request) => {
            Ok(vec![RequestEvent::CancellationAccepted(request.clone())])
        }
        other => Err(invalid(other, Transition::AcceptCancellation)),
    }
}

/// A manager denies a pending withdrawal; the time off stands.
pub fn refuse_cancellation(state: &RequestState) -> Decision {
    match state {
        RequestState::ToCancelTimeOffRequested(request) => {
            Ok(vec![RequestEvent::CancellationRefused(request.clone())])
        }
        other => Err(invalid(other, Transition::RefuseCancellation)),
    }
}

const fn invalid(state: &RequestState, attempted: Transition) -> RuleViolation {
    RuleViolation::InvalidTransition {
        state: state.name(),
        attempted,
    }
}
