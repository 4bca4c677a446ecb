//! Vocabulary of the time-off domain.
//!
//! Values here are immutable once built. Constructors that can fail return a
//! `Result`, and deserialization goes through the same checks, so a
//! `TimeOffRequest` in hand is always well formed.

use std::fmt;

use chrono::NaiveDate;
use nutype::nutype;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use timeoff_types::{StreamId, StreamIdError};
use uuid::Uuid;

/// Morning or afternoon of a calendar day. Mornings sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HalfDay {
    /// First half of the day.
    #[serde(rename = "AM")]
    Am,
    /// Second half of the day.
    #[serde(rename = "PM")]
    Pm,
}

impl fmt::Display for HalfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Am => write!(f, "AM"),
            Self::Pm => write!(f, "PM"),
        }
    }
}

/// A half-day point in the calendar, ordered by date then half-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Boundary {
    date: NaiveDate,
    half_day: HalfDay,
}

impl Boundary {
    /// Boundary at `half_day` of `date`.
    pub const fn new(date: NaiveDate, half_day: HalfDay) -> Self {
        Self { date, half_day }
    }

    /// Calendar date of the boundary.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Half of the day the boundary falls on.
    pub const fn half_day(&self) -> HalfDay {
        self.half_day
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.half_day)
    }
}

/// The employee a request belongs to.
///
/// A user id doubles as the key of that employee's event stream, so it obeys
/// the same rules as a [`StreamId`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(StreamId);

impl UserId {
    /// Parse a user id.
    pub fn try_new(value: impl Into<String>) -> Result<Self, StreamIdError> {
        StreamId::try_new(value.into()).map(Self)
    }

    /// The stream holding this user's events.
    pub const fn stream_id(&self) -> &StreamId {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique identifier of a time-off request.
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRef,
    Display,
    From,
    Into,
    Serialize,
    Deserialize
))]
pub struct RequestId(Uuid);

impl RequestId {
    /// A fresh, time-ordered identifier.
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7())
    }
}

/// Reasons a [`TimeOffRequest`] cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    /// The end boundary lies before the start boundary.
    #[error("request ends at {end}, before it starts at {start}")]
    EndsBeforeStart {
        /// Requested start.
        start: Boundary,
        /// Requested end.
        end: Boundary,
    },
}

/// An employee's request to be away between two half-day boundaries.
///
/// Both boundaries are inclusive and `start <= end` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RequestFields")]
pub struct TimeOffRequest {
    user_id: UserId,
    request_id: RequestId,
    start: Boundary,
    end: Boundary,
}

impl TimeOffRequest {
    /// Build a request, rejecting one that ends before it starts.
    pub fn try_new(
        user_id: UserId,
        request_id: RequestId,
        start: Boundary,
        end: Boundary,
    ) -> Result<Self, InvalidRequest> {
        if end < start {
            return Err(InvalidRequest::EndsBeforeStart { start, end });
        }

        Ok(Self {
            user_id,
            request_id,
            start,
            end,
        })
    }

    /// Employee who asked for the time off.
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Identifier of this request.
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// First half-day off.
    pub const fn start(&self) -> Boundary {
        self.start
    }

    /// Last half-day off.
    pub const fn end(&self) -> Boundary {
        self.end
    }
}

#[derive(Deserialize)]
struct RequestFields {
    user_id: UserId,
    request_id: RequestId,
    start: Boundary,
    end: Boundary,
}

impl TryFrom<RequestFields> for TimeOffRequest {
    type Error = InvalidRequest;

    fn try_from(fields: RequestFields) -> Result<Self, Self::Error> {
        Self::try_new(fields.user_id, fields.request_id, fields.start, fields.end)
    }
}
