//! Intents an employee or manager can express about a time-off request.

use serde::{Deserialize, Serialize};

use crate::types::{RequestId, TimeOffRequest, UserId};

/// Something someone wants to happen to a time-off request.
///
/// Commands are routed by [`Command::user_id`]: every command is decided
/// against the event stream of the employee who owns the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "command")]
pub enum Command {
    /// An employee asks for time off.
    RequestTimeOff(TimeOffRequest),
    /// An employee asks to withdraw a request that has already started.
    RequestToCancelTimeOff(TimeOffRequest),
    /// A manager turns down a request that has not started yet.
    RefuseRequest(TimeOffRequest),
    /// A manager cancels an active request.
    CancelRequest {
        /// Owner of the request.
        user_id: UserId,
        /// Request to cancel.
        request_id: RequestId,
    },
    /// A manager approves a pending request.
    ValidateRequest {
        /// Owner of the request.
        user_id: UserId,
        /// Request to approve.
        request_id: RequestId,
    },
    /// A manager grants an employee's cancellation request.
    AcceptCancellation {
        /// Owner of the request.
        user_id: UserId,
        /// Request whose cancellation is granted.
        request_id: RequestId,
    },
    /// A manager denies an employee's cancellation request.
    RefuseCancellation {
        /// Owner of the request.
        user_id: UserId,
        /// Request whose cancellation is denied.
        request_id: RequestId,
    },
}

impl Command {
    /// The employee whose stream this command is decided against.
    pub const fn user_id(&self) -> &UserId {
        match self {
            Self::RequestTimeOff(request)
            | Self::RequestToCancelTimeOff(request)
            | Self::RefuseRequest(request) => request.user_id(),
            Self::CancelRequest { user_id, .. }
            | Self::ValidateRequest { user_id, .. }
            | Self::AcceptCancellation { user_id, .. }
            | Self::RefuseCancellation { user_id, .. } => user_id,
        }
    }

    /// Variant name, used as a log field.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestTimeOff(_) => "RequestTimeOff",
            Self::RequestToCancelTimeOff(_) => "RequestToCancelTimeOff",
            Self::RefuseRequest(_) => "RefuseRequest",
            Self::CancelRequest { .. } => "CancelRequest",
            Self::ValidateRequest { .. } => "ValidateRequest",
            Self::AcceptCancellation { .. } => "AcceptCancellation",
            Self::RefuseCancellation { .. } => "RefuseCancellation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Boundary, HalfDay};
    use chrono::NaiveDate;

    fn request_for(user: &str) -> TimeOffRequest {
        let day = NaiveDate::from_ymd_opt(2026, 12, 24).expect("valid date");
        TimeOffRequest::try_new(
            UserId::try_new(user).expect("valid user id"),
            RequestId::generate(),
            Boundary::new(day, HalfDay::Am),
            Boundary::new(day, HalfDay::Pm),
        )
        .expect("valid request")
    }

    #[test]
    fn request_carrying_commands_route_to_the_request_owner() {
        let request = request_for("employee-alice");

        for command in [
            Command::RequestTimeOff(request.clone()),
            Command::RequestToCancelTimeOff(request.clone()),
            Command::RefuseRequest(request.clone()),
        ] {
            assert_eq!(command.user_id(), request.user_id(), "{}", command.name());
        }
    }

    #[test]
    fn identifier_commands_route_to_the_named_user() {
        let user_id = UserId::try_new("employee-bob").expect("valid user id");
        let request_id = RequestId::generate();

        let command = Command::AcceptCancellation {
            user_id: user_id.clone(),
            request_id,
        };

        assert_eq!(command.user_id(), &user_id);
        assert_eq!(command.name(), "AcceptCancellation");
    }

    #[test]
    fn commands_serialize_with_a_type_tag() {
        let command = Command::ValidateRequest {
            user_id: UserId::try_new("employee-carol").expect("valid user id"),
            request_id: RequestId::generate(),
        };

        let json = serde_json::to_value(&command).expect("serializable");

        assert_eq!(json["type"], "ValidateRequest");
        assert_eq!(json["command"]["user_id"], "employee-carol");
    }
}
