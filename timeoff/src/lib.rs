//! Time-off requests, event sourced.
//!
//! An employee's requests live in one event stream keyed by their
//! [`UserId`]. The current state of every request is a fold over that stream
//! ([`get_all_requests`]), and each [`Command`] is decided by a pure rule
//! against it, yielding new [`RequestEvent`]s or a [`RuleViolation`].
//!
//! - [`CommandHandler::decide`] decides against a history you already hold.
//! - [`CommandHandler::handle`] / [`handle_command`] read the stream first but
//!   never write.
//! - [`execute`] reads, decides and appends with an expected-version check,
//!   retrying on conflicts per [`RetryPolicy`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod command;
mod errors;
mod event;
mod executor;
mod handler;
mod overlap;
pub mod rules;
mod state;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::Command;
pub use errors::{CommandError, RuleViolation, Transition};
pub use event::RequestEvent;
pub use executor::{
    execute, BackoffMultiplier, BaseDelayMs, MaxDelayMs, MaxRetries, RetryPolicy,
};
pub use handler::{handle_command, CommandHandler};
pub use overlap::{NoOverlapCheck, OverlapPolicy};
pub use rules::{Decision, RuleContext};
pub use state::{evolve, get_all_requests, get_request_state, RequestState};
pub use types::{Boundary, HalfDay, InvalidRequest, RequestId, TimeOffRequest, UserId};

pub use timeoff_types::{
    Event, EventStore, EventStoreError, EventStreamReader, EventStreamSlice, Operation, StreamId,
    StreamIdError, StreamVersion, StreamWriteEntry, StreamWrites,
};
