use chrono::{Duration, NaiveDate};
use timeoff::{
    execute, BaseDelayMs, Boundary, Command, CommandHandler, Event, EventStore, EventStoreError,
    EventStreamReader, EventStreamSlice, FixedClock, HalfDay, MaxRetries, RequestId,
    RetryPolicy, StreamId, StreamWrites, TimeOffRequest, UserId,
};
use timeoff_memory::InMemoryEventStore;
use tokio::sync::Mutex;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
}

fn handler() -> CommandHandler<FixedClock> {
    CommandHandler::new().with_clock(FixedClock::new(today()))
}

fn request(user: &str, start_offset_days: i64) -> TimeOffRequest {
    let start = today() + Duration::days(start_offset_days);
    TimeOffRequest::try_new(
        UserId::try_new(user).expect("valid user id"),
        RequestId::generate(),
        Boundary::new(start, HalfDay::Am),
        Boundary::new(start, HalfDay::Pm),
    )
    .expect("valid request")
}

/// Conflicts on the first append only.
struct ConflictOnceStore {
    inner: InMemoryEventStore,
    conflicted: Mutex<bool>,
}

impl EventStore for ConflictOnceStore {
    async fn read_stream<E: Event>(
        &self,
        stream_id: StreamId,
    ) -> Result<EventStreamReader<E>, EventStoreError> {
        self.inner.read_stream(stream_id).await
    }

    async fn append_events(
        &self,
        writes: StreamWrites,
    ) -> Result<EventStreamSlice, EventStoreError> {
        let mut conflicted = self.conflicted.lock().await;
        if *conflicted {
            self.inner.append_events(writes).await
        } else {
            *conflicted = true;
            Err(EventStoreError::VersionConflict)
        }
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn handled_commands_are_traced_with_the_owner() {
    // Given: An empty store
    let store = InMemoryEventStore::new();

    // When: A request is handled
    let result = handler()
        .handle(
            &store,
            &Command::RequestTimeOff(request("employee-traced", 3)),
        )
        .await;

    // Then: The handler span and its outcome are logged
    assert!(result.is_ok());
    assert!(logs_contain("timeoff.handle_command"));
    assert!(logs_contain("command accepted"));
    assert!(logs_contain("employee-traced"));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn rejections_are_logged_with_their_reason() {
    // Given: An empty store
    let store = InMemoryEventStore::new();

    // When: A request starting today is executed
    let result = execute(
        &store,
        &handler(),
        &Command::RequestTimeOff(request("employee-late", 0)),
        &RetryPolicy::new(),
    )
    .await;

    // Then: The rejection is logged under the executor span
    assert!(result.is_err());
    assert!(logs_contain("timeoff.execute"));
    assert!(logs_contain("command rejected"));
    assert!(logs_contain("starts in the past"));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn retried_conflicts_are_logged() {
    // Given: A store that conflicts once
    let store = ConflictOnceStore {
        inner: InMemoryEventStore::new(),
        conflicted: Mutex::new(false),
    };
    let policy = RetryPolicy::new()
        .max_retries(MaxRetries::try_new(2).expect("valid retry count"))
        .base_delay(BaseDelayMs::try_new(1).expect("valid delay"));

    // When: A request is executed
    let result = execute(
        &store,
        &handler(),
        &Command::RequestTimeOff(request("employee-retried", 3)),
        &policy,
    )
    .await;

    // Then: The retry and the final append are both logged
    assert!(result.is_ok());
    assert!(logs_contain("version conflict, retrying"));
    assert!(logs_contain("events appended"));
}
