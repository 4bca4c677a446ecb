//! Leave lifecycle example
//!
//! Walks one employee through the life of two requests against an in-memory
//! store:
//! - A holiday next week is requested and validated
//! - A sick-day request that already started is withdrawn and the withdrawal
//!   accepted
//! - A manager's attempt to validate twice is rejected
//!
//! Run with `RUST_LOG=info` to see the handler and executor spans.

use anyhow::Result;
use chrono::Duration;
use timeoff::{
    execute, Boundary, Clock, Command, CommandHandler, HalfDay, RequestId, RequestState,
    RetryPolicy, SystemClock, TimeOffRequest, UserId,
};
use timeoff_memory::InMemoryEventStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let store = InMemoryEventStore::new();
    let handler = CommandHandler::new();
    let policy = RetryPolicy::default();
    let today = SystemClock.today();
    let employee = UserId::try_new("employee-ada")?;

    // A week off, from an afternoon to a morning
    let holiday = TimeOffRequest::try_new(
        employee.clone(),
        RequestId::generate(),
        Boundary::new(today + Duration::days(7), HalfDay::Pm),
        Boundary::new(today + Duration::days(14), HalfDay::Am),
    )?;
    execute(
        &store,
        &handler,
        &Command::RequestTimeOff(holiday.clone()),
        &policy,
    )
    .await?;
    info!("Holiday requested from {} to {}", holiday.start(), holiday.end());

    let validate = Command::ValidateRequest {
        user_id: employee.clone(),
        request_id: holiday.request_id(),
    };
    execute(&store, &handler, &validate, &policy).await?;
    info!("Holiday validated");

    match execute(&store, &handler, &validate, &policy).await {
        Ok(_) => info!("Second validation unexpectedly accepted"),
        Err(error) => info!("Second validation rejected: {error}"),
    }

    // Time off that began yesterday can no longer be requested, only withdrawn
    let sick_day = TimeOffRequest::try_new(
        employee.clone(),
        RequestId::generate(),
        Boundary::new(today - Duration::days(1), HalfDay::Am),
        Boundary::new(today, HalfDay::Pm),
    )?;
    match execute(
        &store,
        &handler,
        &Command::RequestTimeOff(sick_day.clone()),
        &policy,
    )
    .await
    {
        Ok(_) => info!("Sick day unexpectedly accepted"),
        Err(error) => info!("Sick day rejected as a new request: {error}"),
    }

    execute(
        &store,
        &handler,
        &Command::RequestToCancelTimeOff(sick_day.clone()),
        &policy,
    )
    .await?;
    execute(
        &store,
        &handler,
        &Command::AcceptCancellation {
            user_id: employee.clone(),
            request_id: sick_day.request_id(),
        },
        &policy,
    )
    .await?;
    info!("Withdrawal of the sick day accepted");

    let requests = handler.requests(&store, &employee).await?;
    let mut summary: Vec<(&RequestId, &RequestState)> = requests.iter().collect();
    summary.sort_by_key(|(request_id, _)| **request_id);
    for (request_id, state) in summary {
        info!("{request_id}: {}", state.name());
    }

    Ok(())
}
