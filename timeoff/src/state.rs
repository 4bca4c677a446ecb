//! Rebuilding request state from history.
//!
//! Nothing here looks at the store: callers hand in the events they read and
//! get the current lifecycle stage back.

use std::collections::HashMap;

use crate::event::RequestEvent;
use crate::types::{RequestId, TimeOffRequest};

/// Lifecycle stage of one time-off request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    /// No event has been recorded for the request.
    #[default]
    NotCreated,
    /// Waiting for a manager's decision.
    PendingValidation(TimeOffRequest),
    /// The employee asked to withdraw it.
    ToCancelTimeOffRequested(TimeOffRequest),
    /// A manager denied the withdrawal; the time off stands.
    RequestToCancelTimeOffRefused(TimeOffRequest),
    /// Approved by a manager.
    Validated(TimeOffRequest),
    /// Turned down by a manager.
    Refused(TimeOffRequest),
    /// Withdrawn or cancelled.
    Cancelled(TimeOffRequest),
}

impl RequestState {
    /// Whether the request still counts as open time off.
    pub const fn is_active(&self) -> bool {
        matches!(
            self,
            Self::PendingValidation(_)
                | Self::ToCancelTimeOffRequested(_)
                | Self::RequestToCancelTimeOffRefused(_)
                | Self::Validated(_)
        )
    }

    /// The request in this state, `None` before it was created.
    pub const fn request(&self) -> Option<&TimeOffRequest> {
        match self {
            Self::NotCreated => None,
            Self::PendingValidation(request)
            | Self::ToCancelTimeOffRequested(request)
            | Self::RequestToCancelTimeOffRefused(request)
            | Self::Validated(request)
            | Self::Refused(request)
            | Self::Cancelled(request) => Some(request),
        }
    }

    /// Stable name of the stage.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotCreated => "NotCreated",
            Self::PendingValidation(_) => "PendingValidation",
            Self::ToCancelTimeOffRequested(_) => "ToCancelTimeOffRequested",
            Self::RequestToCancelTimeOffRefused(_) => "RequestToCancelTimeOffRefused",
            Self::Validated(_) => "Validated",
            Self::Refused(_) => "Refused",
            Self::Cancelled(_) => "Cancelled",
        }
    }
}

/// Apply one event to a state.
///
/// The next state depends only on the event: the prior state is accepted so
/// the function folds, not consulted.
pub fn evolve(_prior: &RequestState, event: &RequestEvent) -> RequestState {
    match event {
        RequestEvent::RequestCreated(request) => RequestState::PendingValidation(request.clone()),
        RequestEvent::CancellationRequested(request) => {
            RequestState::ToCancelTimeOffRequested(request.clone())
        }
        RequestEvent::CancellationRefused(request) => {
            RequestState::RequestToCancelTimeOffRefused(request.clone())
        }
        RequestEvent::CancellationAccepted(request) | RequestEvent::RequestCancelled(request) => {
            RequestState::Cancelled(request.clone())
        }
        RequestEvent::RequestRefused(request) => RequestState::Refused(request.clone()),
        RequestEvent::RequestValidated(request) => RequestState::Validated(request.clone()),
    }
}

/// Fold the history of a single request, oldest first.
pub fn get_request_state<'a>(events: impl IntoIterator<Item = &'a RequestEvent>) -> RequestState {
    events
        .into_iter()
        .fold(RequestState::NotCreated, |state, event| evolve(&state, event))
}

/// Fold a user's whole stream into the state of each request it mentions.
///
/// Events only touch the entry of their own request, so interleaving between
/// requests does not matter; ordering within one request does.
pub fn get_all_requests<'a>(
    events: impl IntoIterator<Item = &'a RequestEvent>,
) -> HashMap<RequestId, RequestState> {
    let mut requests: HashMap<RequestId, RequestState> = HashMap::new();

    for event in events {
        let state = requests.entry(event.request().request_id()).or_default();
        *state = evolve(state, event);
    }

    requests
}
