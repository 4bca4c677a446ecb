//! Facts recorded about time-off requests.

use serde::{Deserialize, Serialize};
use timeoff_types::{Event, StreamId};

use crate::types::TimeOffRequest;

/// Something that happened to a time-off request.
///
/// Every variant carries the full request it concerns. Events are stored in
/// the stream of the request's owner and serialize as
/// `{"type": "<variant>", "request": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "request")]
pub enum RequestEvent {
    /// The employee asked for time off.
    RequestCreated(TimeOffRequest),
    /// The employee asked to withdraw a started request.
    CancellationRequested(TimeOffRequest),
    /// A manager denied the withdrawal.
    CancellationRefused(TimeOffRequest),
    /// A manager granted the withdrawal.
    CancellationAccepted(TimeOffRequest),
    /// The request was cancelled outright.
    RequestCancelled(TimeOffRequest),
    /// A manager refused the request.
    RequestRefused(TimeOffRequest),
    /// A manager approved the request.
    RequestValidated(TimeOffRequest),
}

impl RequestEvent {
    /// The request this event is about.
    pub const fn request(&self) -> &TimeOffRequest {
        match self {
            Self::RequestCreated(request)
            | Self::CancellationRequested(request)
            | Self::CancellationRefused(request)
            | Self::CancellationAccepted(request)
            | Self::RequestCancelled(request)
            | Self::RequestRefused(request)
            | Self::RequestValidated(request) => request,
        }
    }
}

impl Event for RequestEvent {
    fn stream_id(&self) -> &StreamId {
        self.request().user_id().stream_id()
    }

    fn event_type_name(&self) -> &'static str {
        match self {
            Self::RequestCreated(_) => "RequestCreated",
            Self::CancellationRequested(_) => "CancellationRequested",
            Self::CancellationRefused(_) => "CancellationRefused",
            Self::CancellationAccepted(_) => "CancellationAccepted",
            Self::RequestCancelled(_) => "RequestCancelled",
            Self::RequestRefused(_) => "RequestRefused",
            Self::RequestValidated(_) => "RequestValidated",
        }
    }
}
