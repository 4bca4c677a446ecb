use crate::event::Event;
use crate::validation::no_glob_metacharacters;
use nutype::nutype;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;

/// A batch of events to append, grouped by stream.
///
/// Every stream touched by the batch must first be registered with the
/// version the writer observed when it read the stream. Stores compare these
/// expected versions with the current ones before writing anything, which is
/// how two commands racing on the same employee's stream are told apart.
#[derive(Debug)]
pub struct StreamWrites {
    entries: Vec<StreamWriteEntry>,
    expected_versions: HashMap<StreamId, StreamVersion>,
}

/// One serialized event waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamWriteEntry {
    /// Target stream.
    pub stream_id: StreamId,
    /// Variant name reported by [`Event::event_type_name`].
    pub event_type: &'static str,
    /// JSON payload of the event.
    pub event_data: Value,
}

impl StreamWrites {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            expected_versions: HashMap::new(),
        }
    }

    /// Register a stream and the version it is expected to be at.
    ///
    /// Registering the same stream twice is fine as long as both calls agree
    /// on the version.
    pub fn register_stream(
        self,
        stream_id: StreamId,
        expected_version: StreamVersion,
    ) -> Result<Self, EventStoreError> {
        use std::collections::hash_map::Entry;

        let mut writes = self;

        match writes.expected_versions.entry(stream_id.clone()) {
            Entry::Vacant(entry) => {
                let _ = entry.insert(expected_version);
                Ok(writes)
            }
            Entry::Occupied(entry) => {
                let first_version = *entry.get();

                if first_version == expected_version {
                    Ok(writes)
                } else {
                    Err(EventStoreError::ConflictingExpectedVersions {
                        stream_id,
                        first_version,
                        second_version: expected_version,
                    })
                }
            }
        }
    }

    /// Serialize an event and add it to the batch.
    ///
    /// The event's stream must already be registered, otherwise
    /// [`EventStoreError::UndeclaredStream`] is returned.
    pub fn append<E: Event>(self, event: &E) -> Result<Self, EventStoreError> {
        let mut writes = self;
        let stream_id = event.stream_id().clone();

        if !writes.expected_versions.contains_key(&stream_id) {
            return Err(EventStoreError::UndeclaredStream { stream_id });
        }

        let event_data =
            serde_json::to_value(event).map_err(|error| EventStoreError::SerializationFailed {
                stream_id: stream_id.clone(),
                detail: error.to_string(),
            })?;

        writes.entries.push(StreamWriteEntry {
            stream_id,
            event_type: event.event_type_name(),
            event_data,
        });

        Ok(writes)
    }

    /// Append every event of an iterator, stopping at the first failure.
    pub fn append_all<'a, E, I>(self, events: I) -> Result<Self, EventStoreError>
    where
        E: Event + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        events.into_iter().try_fold(self, Self::append)
    }

    /// Streams registered so far with their expected versions.
    pub const fn expected_versions(&self) -> &HashMap<StreamId, StreamVersion> {
        &self.expected_versions
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch carries no events.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the batch, yielding its entries in append order.
    pub fn into_entries(self) -> Vec<StreamWriteEntry> {
        self.entries
    }
}

impl Default for StreamWrites {
    fn default() -> Self {
        Self::new()
    }
}

/// Contract for event store implementations.
///
/// The time-off core needs exactly two operations from a store:
/// 1. read the full, ordered history of one stream
/// 2. atomically append a batch of events with version checks
///
/// How a backend achieves atomicity (locks, transactions) stays behind this
/// trait. Reading a stream that was never written to is not an error; it
/// yields an empty history.
pub trait EventStore {
    /// Read every event of a stream, oldest first.
    ///
    /// The type parameter selects the event payload the caller expects;
    /// stored payloads that cannot be decoded into it yield
    /// [`EventStoreError::DeserializationFailed`].
    fn read_stream<E: Event>(
        &self,
        stream_id: StreamId,
    ) -> impl Future<Output = Result<EventStreamReader<E>, EventStoreError>> + Send;

    /// Atomically append a batch of events.
    ///
    /// Each registered stream's current version must equal its expected
    /// version, otherwise nothing is written and
    /// [`EventStoreError::VersionConflict`] is returned. Callers are expected
    /// to re-read, re-decide and retry on conflict.
    ///
    /// ```ignore
    /// let writes = StreamWrites::new()
    ///     .register_stream(stream_id.clone(), reader.version())
    ///     .and_then(|writes| writes.append(&event))?;
    ///
    /// match store.append_events(writes).await {
    ///     Ok(slice) => println!("{} events persisted", slice.len()),
    ///     Err(EventStoreError::VersionConflict) => println!("stream moved on, retry"),
    ///     Err(other) => return Err(other),
    /// }
    /// ```
    fn append_events(
        &self,
        writes: StreamWrites,
    ) -> impl Future<Output = Result<EventStreamSlice, EventStoreError>> + Send;
}

/// Identifier of one event stream.
///
/// Stream ids are trimmed, non-empty, at most 255 characters and free of
/// glob metacharacters (`*`, `?`, `[`, `]`).
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255, predicate = no_glob_metacharacters),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct StreamId(String);

/// Number of events a stream holds.
///
/// An empty stream is at version 0; every appended event increments it.
#[nutype(derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Display))]
pub struct StreamVersion(usize);

impl StreamVersion {
    /// The version of a stream nobody has written to.
    pub fn initial() -> Self {
        Self::new(0)
    }
}

/// Identifies the store operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading events from a stream.
    ReadStream,
    /// Appending events to streams.
    AppendEvents,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadStream => write!(f, "read_stream"),
            Self::AppendEvents => write!(f, "append_events"),
        }
    }
}

/// Errors raised by event store operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EventStoreError {
    /// A stream was registered twice in one batch with different versions.
    #[error(
        "conflicting expected versions for stream {stream_id}: first={first_version}, second={second_version}"
    )]
    ConflictingExpectedVersions {
        /// Stream registered twice.
        stream_id: StreamId,
        /// Version given by the first registration.
        first_version: StreamVersion,
        /// Version given by the second registration.
        second_version: StreamVersion,
    },

    /// An event was appended to a stream that was never registered.
    #[error("stream {stream_id} must be registered before appending events")]
    UndeclaredStream {
        /// Stream the event belongs to.
        stream_id: StreamId,
    },

    /// An event could not be encoded.
    #[error("failed to serialize event for stream {stream_id}: {detail}")]
    SerializationFailed {
        /// Stream the event belongs to.
        stream_id: StreamId,
        /// Encoder message.
        detail: String,
    },

    /// A stored payload could not be decoded into the requested event type.
    #[error("failed to deserialize event for stream {stream_id}: {detail}")]
    DeserializationFailed {
        /// Stream being read.
        stream_id: StreamId,
        /// Decoder message.
        detail: String,
    },

    /// The backing store itself failed.
    #[error("{operation} operation failed")]
    StoreFailure {
        /// Operation that hit the failure.
        operation: Operation,
    },

    /// A registered stream was not at its expected version.
    ///
    /// Another writer appended between this writer's read and write.
    #[error("version conflict detected")]
    VersionConflict,
}

/// The history of one stream, oldest event first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStreamReader<E: Event> {
    events: Vec<E>,
}

impl<E: Event> EventStreamReader<E> {
    /// Wrap an ordered list of events.
    pub const fn new(events: Vec<E>) -> Self {
        Self { events }
    }

    /// Number of events in the stream.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the stream holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The version the stream was at when it was read.
    ///
    /// Register this version when appending the events decided from this
    /// history.
    pub fn version(&self) -> StreamVersion {
        StreamVersion::new(self.events.len())
    }

    /// The oldest event, if any.
    pub fn first(&self) -> Option<&E> {
        self.events.first()
    }

    /// Iterate over the events in stream order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.events.iter()
    }

    /// Borrow the events as a slice.
    pub fn as_slice(&self) -> &[E] {
        &self.events
    }
}

impl<E: Event> IntoIterator for EventStreamReader<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Summary of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStreamSlice {
    versions: HashMap<StreamId, StreamVersion>,
    appended: usize,
}

impl EventStreamSlice {
    /// Build a summary from the new stream versions and the event count.
    pub const fn new(versions: HashMap<StreamId, StreamVersion>, appended: usize) -> Self {
        Self { versions, appended }
    }

    /// Number of events written.
    pub const fn len(&self) -> usize {
        self.appended
    }

    /// Whether the append wrote nothing.
    pub const fn is_empty(&self) -> bool {
        self.appended == 0
    }

    /// The version a stream reached after the append.
    pub fn version_of(&self, stream_id: &StreamId) -> Option<StreamVersion> {
        self.versions.get(stream_id).copied()
    }
}

/// Lets both owned stores and references be passed where a store is expected.
impl<T: EventStore + Sync> EventStore for &T {
    async fn read_stream<E: Event>(
        &self,
        stream_id: StreamId,
    ) -> Result<EventStreamReader<E>, EventStoreError> {
        (*self).read_stream(stream_id).await
    }

    async fn append_events(
        &self,
        writes: StreamWrites,
    ) -> Result<EventStreamSlice, EventStoreError> {
        (*self).append_events(writes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct LedgerEntry {
        stream_id: StreamId,
        note: String,
    }

    impl Event for LedgerEntry {
        fn stream_id(&self) -> &StreamId {
            &self.stream_id
        }

        fn event_type_name(&self) -> &'static str {
            "LedgerEntry"
        }
    }

    fn entry(stream_id: &StreamId, note: &str) -> LedgerEntry {
        LedgerEntry {
            stream_id: stream_id.clone(),
            note: note.to_string(),
        }
    }

    #[test]
    fn stream_writes_accepts_duplicate_stream_with_same_expected_version() {
        let stream_id = StreamId::try_new("employee-same-version").expect("valid stream id");

        let writes_result = StreamWrites::new()
            .register_stream(stream_id.clone(), StreamVersion::new(0))
            .and_then(|writes| writes.append(&entry(&stream_id, "first")))
            .and_then(|writes| writes.register_stream(stream_id.clone(), StreamVersion::new(0)))
            .and_then(|writes| writes.append(&entry(&stream_id, "second")));

        assert_eq!(writes_result.as_ref().map(StreamWrites::len), Ok(2));
    }

    #[test]
    fn stream_writes_rejects_duplicate_stream_with_conflicting_expected_versions() {
        let stream_id = StreamId::try_new("employee-conflict").expect("valid stream id");

        let conflict = StreamWrites::new()
            .register_stream(stream_id.clone(), StreamVersion::new(0))
            .and_then(|writes| writes.append(&entry(&stream_id, "first")))
            .and_then(|writes| writes.register_stream(stream_id.clone(), StreamVersion::new(1)));

        let message = conflict.expect_err("versions disagree").to_string();

        assert_eq!(
            message,
            "conflicting expected versions for stream employee-conflict: first=0, second=1"
        );
    }

    #[test]
    fn stream_writes_rejects_appends_for_unregistered_streams() {
        let stream_id = StreamId::try_new("employee-unregistered").expect("valid stream id");

        let error = StreamWrites::new()
            .append(&entry(&stream_id, "orphan"))
            .expect_err("append without prior registration should fail");

        assert!(matches!(
            error,
            EventStoreError::UndeclaredStream { stream_id: ref actual } if *actual == stream_id
        ));
    }

    #[test]
    fn append_all_keeps_event_order_and_records_type_names() {
        let stream_id = StreamId::try_new("employee-batch").expect("valid stream id");

        let writes = StreamWrites::new()
            .register_stream(stream_id.clone(), StreamVersion::initial())
            .and_then(|writes| {
                writes.append_all(&[entry(&stream_id, "a"), entry(&stream_id, "b")])
            })
            .expect("batch should build");

        let entries = writes.into_entries();
        let notes: Vec<_> = entries
            .iter()
            .map(|entry| entry.event_data["note"].clone())
            .collect();

        assert_eq!(notes, vec![Value::from("a"), Value::from("b")]);
        assert!(entries.iter().all(|entry| entry.event_type == "LedgerEntry"));
    }

    #[test]
    fn expected_versions_returns_registered_streams_and_versions() {
        let stream_a = StreamId::try_new("employee-a").expect("valid stream id");
        let stream_b = StreamId::try_new("employee-b").expect("valid stream id");

        let writes = StreamWrites::new()
            .register_stream(stream_a.clone(), StreamVersion::new(0))
            .and_then(|w| w.register_stream(stream_b.clone(), StreamVersion::new(5)))
            .expect("registration should succeed");

        let versions = writes.expected_versions();

        assert_eq!(versions.len(), 2);
        assert_eq!(versions.get(&stream_a), Some(&StreamVersion::new(0)));
        assert_eq!(versions.get(&stream_b), Some(&StreamVersion::new(5)));
        assert!(writes.is_empty());
    }

    #[test]
    fn stream_id_rejects_glob_metacharacters() {
        for raw in ["employee-*", "employee-?", "employee-[", "employee-]"] {
            assert!(StreamId::try_new(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn stream_id_trims_surrounding_whitespace() {
        let stream_id = StreamId::try_new("  employee-42 ").expect("valid stream id");

        assert_eq!(stream_id.as_ref(), "employee-42");
    }

    #[test]
    fn event_stream_reader_reports_version_from_event_count() {
        let stream_id = StreamId::try_new("employee-reader").expect("valid stream id");
        let events = vec![
            entry(&stream_id, "first"),
            entry(&stream_id, "second"),
            entry(&stream_id, "third"),
        ];

        let reader = EventStreamReader::new(events);

        assert_eq!(reader.len(), 3);
        assert_eq!(reader.version(), StreamVersion::new(3));
        assert_eq!(reader.first().map(|e| e.note.as_str()), Some("first"));
    }

    #[test]
    fn empty_event_stream_reader_is_at_initial_version() {
        let reader: EventStreamReader<LedgerEntry> = EventStreamReader::new(vec![]);

        assert!(reader.is_empty());
        assert_eq!(reader.version(), StreamVersion::initial());
    }

    #[test]
    fn event_stream_reader_into_iter_yields_all_events() {
        let stream_id = StreamId::try_new("employee-into-iter").expect("valid stream id");
        let events = vec![entry(&stream_id, "first"), entry(&stream_id, "second")];

        let reader = EventStreamReader::new(events.clone());
        let borrowed: Vec<&LedgerEntry> = reader.iter().collect();
        assert_eq!(borrowed, events.iter().collect::<Vec<_>>());

        let collected: Vec<LedgerEntry> = reader.into_iter().collect();
        assert_eq!(collected, events);
    }

    #[test]
    fn event_stream_slice_reports_versions_and_count() {
        let stream_id = StreamId::try_new("employee-slice").expect("valid stream id");
        let mut versions = HashMap::new();
        let _ = versions.insert(stream_id.clone(), StreamVersion::new(2));

        let slice = EventStreamSlice::new(versions, 2);

        assert_eq!(slice.len(), 2);
        assert!(!slice.is_empty());
        assert_eq!(slice.version_of(&stream_id), Some(StreamVersion::new(2)));
    }
}
