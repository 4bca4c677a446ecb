//! Routing commands to rules.

use std::collections::HashMap;

use timeoff_types::EventStore;
use tracing::{info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::command::Command;
use crate::errors::{CommandError, RuleViolation};
use crate::event::RequestEvent;
use crate::overlap::{NoOverlapCheck, OverlapPolicy};
use crate::rules::{
    accept_cancellation, cancel_active_requests, cancel_request, create_request,
    refuse_cancellation, request_cancellation, validate_request, Decision, RuleContext,
};
use crate::state::{get_all_requests, RequestState};
use crate::types::{RequestId, TimeOffRequest, UserId};

/// Decides commands against an employee's history.
///
/// The handler owns the capabilities rules need: a [`Clock`] for "today" and
/// an [`OverlapPolicy`]. It reads from a store but never writes; see
/// [`execute`](crate::execute) for the read-decide-append cycle.
///
/// ```rust,ignore
/// let handler = CommandHandler::new().with_clock(FixedClock::new(today));
/// let events = handler.handle(&store, &command).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandHandler<C = SystemClock, O = NoOverlapCheck> {
    clock: C,
    overlap: O,
}

impl CommandHandler {
    /// Handler on the system clock with no overlap detection.
    pub const fn new() -> Self {
        Self {
            clock: SystemClock,
            overlap: NoOverlapCheck,
        }
    }
}

impl<C, O> CommandHandler<C, O>
where
    C: Clock,
    O: OverlapPolicy,
{
    /// Use `clock` to decide what "today" is.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> CommandHandler<C2, O> {
        CommandHandler {
            clock,
            overlap: self.overlap,
        }
    }

    /// Use `overlap` to detect colliding requests.
    pub fn with_overlap_policy<O2: OverlapPolicy>(self, overlap: O2) -> CommandHandler<C, O2> {
        CommandHandler {
            clock: self.clock,
            overlap,
        }
    }

    /// Decide a command against a history without touching any store.
    ///
    /// `history` is the owner's whole stream, oldest event first.
    pub fn decide<'a>(
        &self,
        history: impl IntoIterator<Item = &'a RequestEvent>,
        command: &Command,
    ) -> Decision {
        let all = get_all_requests(history);
        let ctx = RuleContext::new(self.clock.today(), &self.overlap);

        match command {
            Command::RequestTimeOff(request) => create_request(&ctx, &active_requests(&all), request),
            Command::RequestToCancelTimeOff(request) => {
                request_cancellation(&ctx, &active_requests(&all), request)
            }
            Command::RefuseRequest(request) => cancel_request(&ctx, &known_requests(&all), request),
            Command::CancelRequest { request_id, .. } => {
                cancel_active_requests(state_of(&all, *request_id))
            }
            Command::ValidateRequest { request_id, .. } => {
                validate_request(state_of(&all, *request_id))
            }
            Command::AcceptCancellation { request_id, .. } => {
                accept_cancellation(state_of(&all, *request_id))
            }
            Command::RefuseCancellation { request_id, .. } => {
                refuse_cancellation(state_of(&all, *request_id))
            }
        }
    }

    /// Read the owner's stream and decide the command.
    ///
    /// The produced events are returned, not written.
    #[instrument(
        name = "timeoff.handle_command",
        skip(self, store, command),
        fields(user = %command.user_id(), command = command.name())
    )]
    pub async fn handle<S: EventStore>(
        &self,
        store: S,
        command: &Command,
    ) -> Result<Vec<RequestEvent>, CommandError> {
        let history = store
            .read_stream::<RequestEvent>(command.user_id().stream_id().clone())
            .await?;

        let events = self.decide(history.iter(), command).map_err(|violation| {
            log_rejection(command, violation);
            violation
        })?;

        info!(
            user = %command.user_id(),
            command = command.name(),
            event_count = events.len(),
            "[timeoff.handle_command] command accepted"
        );

        Ok(events)
    }

    /// Current state of every request an employee has made.
    pub async fn requests<S: EventStore>(
        &self,
        store: S,
        user_id: &UserId,
    ) -> Result<HashMap<RequestId, RequestState>, CommandError> {
        let history = store
            .read_stream::<RequestEvent>(user_id.stream_id().clone())
            .await?;

        Ok(get_all_requests(history.iter()))
    }
}

/// Decide `command` against `store` with the given clock and no overlap
/// detection.
pub async fn handle_command<S, C>(
    store: S,
    clock: C,
    command: &Command,
) -> Result<Vec<RequestEvent>, CommandError>
where
    S: EventStore,
    C: Clock,
{
    CommandHandler::new()
        .with_clock(clock)
        .handle(store, command)
        .await
}

/// Warn about a command its rule refused.
pub fn log_rejection(command: &Command, violation: RuleViolation) {
    warn!(
        user = %command.user_id(),
        command = command.name(),
        reason = %violation,
        "[timeoff] command rejected"
    );
}

fn active_requests(all: &HashMap<RequestId, RequestState>) -> Vec<TimeOffRequest> {
    collect_requests(all, RequestState::is_active)
}

fn known_requests(all: &HashMap<RequestId, RequestState>) -> Vec<TimeOffRequest> {
    collect_requests(all, |_| true)
}

// Sorted by id so the first reported overlap does not depend on hash order.
fn collect_requests(
    all: &HashMap<RequestId, RequestState>,
    keep: impl Fn(&RequestState) -> bool,
) -> Vec<TimeOffRequest> {
    let mut requests: Vec<TimeOffRequest> = all
        .values()
        .filter(|state| keep(state))
        .filter_map(RequestState::request)
        .cloned()
        .collect();
    requests.sort_by_key(TimeOffRequest::request_id);
    requests
}

fn state_of(all: &HashMap<RequestId, RequestState>, request_id: RequestId) -> &RequestState {
    const NOT_CREATED: &RequestState = &RequestState::NotCreated;

    all.get(&request_id).unwrap_or(NOT_CREATED)
}
