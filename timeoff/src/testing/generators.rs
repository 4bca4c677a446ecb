//! Property test generators for domain types.
//!
//! Each generator only produces values the constructors accept, so tests can
//! `prop_map` straight into domain calls.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use crate::event::RequestEvent;
use crate::types::{Boundary, HalfDay, RequestId, TimeOffRequest, UserId};

/// Generates valid `UserId` values.
pub fn arb_user_id() -> impl Strategy<Value = UserId> {
    "employee-[a-z0-9]{1,16}".prop_filter_map("Invalid UserId", |raw| UserId::try_new(raw).ok())
}

/// Generates `RequestId` values from arbitrary UUIDs.
pub fn arb_request_id() -> impl Strategy<Value = RequestId> {
    any::<u128>().prop_map(|bits| RequestId::from(uuid::Uuid::from_u128(bits)))
}

/// Generates either half of the day.
pub fn arb_half_day() -> impl Strategy<Value = HalfDay> {
    prop_oneof![Just(HalfDay::Am), Just(HalfDay::Pm)]
}

/// Generates boundaries within a few years of 2026.
pub fn arb_boundary() -> impl Strategy<Value = Boundary> {
    (0u64..1_500, arb_half_day()).prop_filter_map("Invalid Boundary", |(offset, half_day)| {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .and_then(|origin| origin.checked_add_days(Days::new(offset)))
            .map(|date| Boundary::new(date, half_day))
    })
}

/// Generates well-formed requests belonging to `user_id`.
///
/// Boundaries are generated independently and swapped when needed, so every
/// value satisfies `start <= end`.
pub fn arb_time_off_request(user_id: UserId) -> impl Strategy<Value = TimeOffRequest> {
    (arb_request_id(), arb_boundary(), arb_boundary()).prop_filter_map(
        "Invalid TimeOffRequest",
        move |(request_id, a, b)| {
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            TimeOffRequest::try_new(user_id.clone(), request_id, start, end).ok()
        },
    )
}

/// Generates any event about `request`.
pub fn arb_request_event(request: TimeOffRequest) -> impl Strategy<Value = RequestEvent> {
    (0u8..7).prop_map(move |kind| event_of_kind(kind, request.clone()))
}

/// Generates one user's interleaved history over up to `max_requests`
/// requests and `max_events` events.
///
/// Events are drawn without regard to lifecycle legality; folds must cope
/// with any order.
pub fn arb_history(
    max_requests: usize,
    max_events: usize,
) -> impl Strategy<Value = Vec<RequestEvent>> {
    arb_user_id()
        .prop_flat_map(move |user_id| {
            prop::collection::vec(arb_time_off_request(user_id), 1..=max_requests.max(1))
        })
        .prop_flat_map(move |requests| {
            let picks = prop::collection::vec((0..requests.len(), 0u8..7), 0..=max_events);
            (Just(requests), picks)
        })
        .prop_map(|(requests, picks)| {
            picks
                .into_iter()
                .map(|(index, kind)| event_of_kind(kind, requests[index].clone()))
                .collect()
        })
}

fn event_of_kind(kind: u8, request: TimeOffRequest) -> RequestEvent {
    match kind {
        0 => RequestEvent::RequestCreated(request),
        1 => RequestEvent::CancellationRequested(request),
        2 => RequestEvent::CancellationRefused(request),
        3 => RequestEvent::CancellationAccepted(request),
        4 => RequestEvent::RequestCancelled(request),
        5 => RequestEvent::RequestRefused(request),
        _ => RequestEvent::RequestValidated(request),
    }
}
