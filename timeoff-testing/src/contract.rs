//! Store-agnostic scenarios every `EventStore` backend must pass.

use std::fmt;

use serde::{Deserialize, Serialize};
use timeoff_types::{
    Event, EventStore, EventStoreError, StreamId, StreamVersion, StreamWrites,
};
use uuid::Uuid;

/// A contract scenario that did not hold for the store under test.
#[derive(Debug)]
pub struct ContractTestFailure {
    scenario: &'static str,
    detail: String,
}

impl ContractTestFailure {
    fn new(scenario: &'static str, detail: impl Into<String>) -> Self {
        Self {
            scenario,
            detail: detail.into(),
        }
    }

    fn builder_error(scenario: &'static str, phase: &'static str, error: &EventStoreError) -> Self {
        Self::new(scenario, format!("builder failure during {phase}: {error}"))
    }

    fn store_error(
        scenario: &'static str,
        operation: &'static str,
        error: &EventStoreError,
    ) -> Self {
        Self::new(
            scenario,
            format!("{operation} operation returned unexpected error: {error}"),
        )
    }

    fn assertion(scenario: &'static str, detail: impl Into<String>) -> Self {
        Self::new(scenario, detail)
    }
}

impl fmt::Display for ContractTestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.scenario, self.detail)
    }
}

impl std::error::Error for ContractTestFailure {}

/// Outcome of one contract scenario.
pub type ContractTestResult = Result<(), ContractTestFailure>;

/// Minimal event written by the contract scenarios.
///
/// `sequence` records the position the scenario wrote it at, so read order
/// can be checked without relying on any domain payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEntry {
    stream_id: StreamId,
    sequence: u32,
}

impl ContractEntry {
    /// Entry for `stream_id` at position `sequence`.
    pub const fn new(stream_id: StreamId, sequence: u32) -> Self {
        Self {
            stream_id,
            sequence,
        }
    }

    /// Position the entry was written at.
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl Event for ContractEntry {
    fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    fn event_type_name(&self) -> &'static str {
        "ContractEntry"
    }
}

fn contract_stream_id(
    scenario: &'static str,
    label: &str,
) -> Result<StreamId, ContractTestFailure> {
    // Unique per run so scenarios can share one backend
    let raw = format!("contract::{scenario}::{label}::{}", Uuid::now_v7());

    StreamId::try_new(raw.clone()).map_err(|error| {
        ContractTestFailure::assertion(
            scenario,
            format!("unable to construct stream id `{raw}`: {error}"),
        )
    })
}

fn builder_step(
    scenario: &'static str,
    phase: &'static str,
    result: Result<StreamWrites, EventStoreError>,
) -> Result<StreamWrites, ContractTestFailure> {
    result.map_err(|error| ContractTestFailure::builder_error(scenario, phase, &error))
}

fn register_contract_stream(
    scenario: &'static str,
    writes: StreamWrites,
    stream_id: &StreamId,
    expected_version: StreamVersion,
) -> Result<StreamWrites, ContractTestFailure> {
    builder_step(
        scenario,
        "register_stream",
        writes.register_stream(stream_id.clone(), expected_version),
    )
}

fn append_contract_entry(
    scenario: &'static str,
    writes: StreamWrites,
    stream_id: &StreamId,
    sequence: u32,
) -> Result<StreamWrites, ContractTestFailure> {
    builder_step(
        scenario,
        "append",
        writes.append(&ContractEntry::new(stream_id.clone(), sequence)),
    )
}

async fn read_contract_stream<S: EventStore>(
    scenario: &'static str,
    store: &S,
    stream_id: &StreamId,
) -> Result<Vec<ContractEntry>, ContractTestFailure> {
    store
        .read_stream::<ContractEntry>(stream_id.clone())
        .await
        .map(|reader| reader.into_iter().collect())
        .map_err(|error| ContractTestFailure::store_error(scenario, "read_stream", &error))
}

/// Events appended in one batch are read back complete and in order, and the
/// reader reports the matching version.
pub async fn test_basic_read_write<F, S>(make_store: F) -> ContractTestResult
where
    F: Fn() -> S + Send + Sync + Clone + 'static,
    S: EventStore + Send + Sync + 'static,
{
    const SCENARIO: &str = "basic_read_write";

    let store = make_store();
    let stream_id = contract_stream_id(SCENARIO, "employee")?;

    let writes = register_contract_stream(
        SCENARIO,
        StreamWrites::new(),
        &stream_id,
        StreamVersion::initial(),
    )?;
    let writes = append_contract_entry(SCENARIO, writes, &stream_id, 1)?;
    let writes = append_contract_entry(SCENARIO, writes, &stream_id, 2)?;
    let writes = append_contract_entry(SCENARIO, writes, &stream_id, 3)?;

    let slice = store
        .append_events(writes)
        .await
        .map_err(|error| ContractTestFailure::store_error(SCENARIO, "append_events", &error))?;

    if slice.len() != 3 {
        return Err(ContractTestFailure::assertion(
            SCENARIO,
            format!("expected append to report 3 events, observed {}", slice.len()),
        ));
    }

    let reader = store
        .read_stream::<ContractEntry>(stream_id.clone())
        .await
        .map_err(|error| ContractTestFailure::store_error(SCENARIO, "read_stream", &error))?;

    if reader.version() != StreamVersion::new(3) {
        return Err(ContractTestFailure::assertion(
            SCENARIO,
            format!(
                "expected stream to be at version 3 after three appends, observed {}",
                reader.version()
            ),
        ));
    }

    let sequences: Vec<u32> = reader.iter().map(ContractEntry::sequence).collect();
    if sequences != [1, 2, 3] {
        return Err(ContractTestFailure::assertion(
            SCENARIO,
            format!("expected events in append order [1, 2, 3], observed {sequences:?}"),
        ));
    }

    Ok(())
}

/// A writer holding a stale expected version is rejected with
/// [`EventStoreError::VersionConflict`].
pub async fn test_concurrent_version_conflicts<F, S>(make_store: F) -> ContractTestResult
where
    F: Fn() -> S + Send + Sync + Clone + 'static,
    S: EventStore + Send + Sync + 'static,
{
    const SCENARIO: &str = "concurrent_version_conflicts";

    let store = make_store();
    let stream_id = contract_stream_id(SCENARIO, "shared")?;

    let first_writes = register_contract_stream(
        SCENARIO,
        StreamWrites::new(),
        &stream_id,
        StreamVersion::initial(),
    )?;
    let first_writes = append_contract_entry(SCENARIO, first_writes, &stream_id, 1)?;

    let _ = store
        .append_events(first_writes)
        .await
        .map_err(|error| ContractTestFailure::store_error(SCENARIO, "append_events", &error))?;

    // Second writer read the stream before the first append landed
    let conflicting_writes = register_contract_stream(
        SCENARIO,
        StreamWrites::new(),
        &stream_id,
        StreamVersion::initial(),
    )?;
    let conflicting_writes = append_contract_entry(SCENARIO, conflicting_writes, &stream_id, 2)?;

    match store.append_events(conflicting_writes).await {
        Err(EventStoreError::VersionConflict) => Ok(()),
        Err(error) => Err(ContractTestFailure::store_error(
            SCENARIO,
            "append_events",
            &error,
        )),
        Ok(_) => Err(ContractTestFailure::assertion(
            SCENARIO,
            "expected version conflict but append succeeded",
        )),
    }
}

/// Reading one stream never yields events written to another.
pub async fn test_stream_isolation<F, S>(make_store: F) -> ContractTestResult
where
    F: Fn() -> S + Send + Sync + Clone + 'static,
    S: EventStore + Send + Sync + 'static,
{
    const SCENARIO: &str = "stream_isolation";

    let store = make_store();
    let left_stream = contract_stream_id(SCENARIO, "left")?;
    let right_stream = contract_stream_id(SCENARIO, "right")?;

    let writes = register_contract_stream(
        SCENARIO,
        StreamWrites::new(),
        &left_stream,
        StreamVersion::initial(),
    )?;
    let writes =
        register_contract_stream(SCENARIO, writes, &right_stream, StreamVersion::initial())?;
    let writes = append_contract_entry(SCENARIO, writes, &left_stream, 1)?;
    let writes = append_contract_entry(SCENARIO, writes, &right_stream, 1)?;
    let writes = append_contract_entry(SCENARIO, writes, &right_stream, 2)?;

    let _ = store
        .append_events(writes)
        .await
        .map_err(|error| ContractTestFailure::store_error(SCENARIO, "append_events", &error))?;

    for (stream_id, expected_len) in [(&left_stream, 1), (&right_stream, 2)] {
        let entries = read_contract_stream(SCENARIO, &store, stream_id).await?;

        if entries.len() != expected_len {
            return Err(ContractTestFailure::assertion(
                SCENARIO,
                format!(
                    "stream {stream_id} expected {expected_len} events but observed {}",
                    entries.len()
                ),
            ));
        }

        if entries.iter().any(|entry| entry.stream_id() != stream_id) {
            return Err(ContractTestFailure::assertion(
                SCENARIO,
                format!("stream {stream_id} read events belonging to another stream"),
            ));
        }
    }

    Ok(())
}

/// A stream nobody wrote to reads as an empty history at the initial version.
pub async fn test_missing_stream_reads<F, S>(make_store: F) -> ContractTestResult
where
    F: Fn() -> S + Send + Sync + Clone + 'static,
    S: EventStore + Send + Sync + 'static,
{
    const SCENARIO: &str = "missing_stream_reads";

    let store = make_store();
    let stream_id = contract_stream_id(SCENARIO, "ghost")?;

    let reader = store
        .read_stream::<ContractEntry>(stream_id.clone())
        .await
        .map_err(|error| ContractTestFailure::store_error(SCENARIO, "read_stream", &error))?;

    if !reader.is_empty() || reader.version() != StreamVersion::initial() {
        return Err(ContractTestFailure::assertion(
            SCENARIO,
            "expected read_stream to succeed with no events for an untouched stream",
        ));
    }

    Ok(())
}

/// A batch with one stale stream writes nothing to any of its streams.
pub async fn test_conflict_preserves_atomicity<F, S>(make_store: F) -> ContractTestResult
where
    F: Fn() -> S + Send + Sync + Clone + 'static,
    S: EventStore + Send + Sync + 'static,
{
    const SCENARIO: &str = "conflict_preserves_atomicity";

    let store = make_store();
    let left_stream = contract_stream_id(SCENARIO, "left")?;
    let right_stream = contract_stream_id(SCENARIO, "right")?;

    let writes = register_contract_stream(
        SCENARIO,
        StreamWrites::new(),
        &left_stream,
        StreamVersion::initial(),
    )?;
    let writes =
        register_contract_stream(SCENARIO, writes, &right_stream, StreamVersion::initial())?;
    let writes = append_contract_entry(SCENARIO, writes, &left_stream, 1)?;
    let writes = append_contract_entry(SCENARIO, writes, &right_stream, 1)?;

    let _ = store
        .append_events(writes)
        .await
        .map_err(|error| ContractTestFailure::store_error(SCENARIO, "append_events", &error))?;

    // Left is stale, right is current
    let writes = register_contract_stream(
        SCENARIO,
        StreamWrites::new(),
        &left_stream,
        StreamVersion::initial(),
    )?;
    let writes = register_contract_stream(SCENARIO, writes, &right_stream, StreamVersion::new(1))?;
    let writes = append_contract_entry(SCENARIO, writes, &left_stream, 2)?;
    let writes = append_contract_entry(SCENARIO, writes, &right_stream, 2)?;

    match store.append_events(writes).await {
        Err(EventStoreError::VersionConflict) => {
            for stream_id in [&left_stream, &right_stream] {
                let entries = read_contract_stream(SCENARIO, &store, stream_id).await?;
                if entries.len() != 1 {
                    return Err(ContractTestFailure::assertion(
                        SCENARIO,
                        format!(
                            "expected stream {stream_id} to remain at len=1 after failed append, observed {}",
                            entries.len()
                        ),
                    ));
                }
            }

            Ok(())
        }
        Err(error) => Err(ContractTestFailure::store_error(
            SCENARIO,
            "append_events",
            &error,
        )),
        Ok(_) => Err(ContractTestFailure::assertion(
            SCENARIO,
            "expected version conflict but append succeeded",
        )),
    }
}

/// Expands to one `#[tokio::test]` per contract scenario for the given store.
///
/// The calling crate needs `tokio` as a dev-dependency.
#[macro_export]
macro_rules! event_store_contract_tests {
    (suite = $suite:ident, make_store = $make_store:expr $(,)?) => {
        mod $suite {
            use $crate::contract::{
                test_basic_read_write, test_concurrent_version_conflicts,
                test_conflict_preserves_atomicity, test_missing_stream_reads,
                test_stream_isolation,
            };

            #[tokio::test(flavor = "multi_thread")]
            async fn basic_read_write_contract() {
                test_basic_read_write($make_store)
                    .await
                    .expect("event store contract failed");
            }

            #[tokio::test(flavor = "multi_thread")]
            async fn concurrent_version_conflicts_contract() {
                test_concurrent_version_conflicts($make_store)
                    .await
                    .expect("event store contract failed");
            }

            #[tokio::test(flavor = "multi_thread")]
            async fn stream_isolation_contract() {
                test_stream_isolation($make_store)
                    .await
                    .expect("event store contract failed");
            }

            #[tokio::test(flavor = "multi_thread")]
            async fn missing_stream_reads_contract() {
                test_missing_stream_reads($make_store)
                    .await
                    .expect("event store contract failed");
            }

            #[tokio::test(flavor = "multi_thread")]
            async fn conflict_preserves_atomicity_contract() {
                test_conflict_preserves_atomicity($make_store)
                    .await
                    .expect("event store contract failed");
            }
        }
    };
}

pub use event_store_contract_tests;
