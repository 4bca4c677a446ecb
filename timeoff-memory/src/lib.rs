//! In-memory event store for the time-off request core.
//!
//! This crate provides an implementation of the `EventStore` trait from
//! `timeoff-types` that keeps every stream in process memory. It is meant for
//! tests, demos and prototyping; nothing survives a restart.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use timeoff_types::{
    Event, EventStore, EventStoreError, EventStreamReader, EventStreamSlice, Operation, StreamId,
    StreamVersion, StreamWriteEntry, StreamWrites,
};
use tracing::{debug, info, instrument, warn};

/// A persisted payload together with the variant name it was written under.
#[derive(Debug, Clone)]
struct StoredEvent {
    event_type: &'static str,
    event_data: Value,
}

/// Thread-safe in-memory event store.
///
/// Streams are append-only vectors of JSON payloads. A stream's version is
/// the number of events it holds, so an untouched stream is at version 0 and
/// reads of it succeed with an empty history.
///
/// Appends lock the whole store, check every registered stream's expected
/// version, and only then write. A batch therefore lands completely or not at
/// all.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: Mutex<HashMap<StreamId, Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Variant names of every event in a stream, oldest first.
    ///
    /// Handy for asserting what a command wrote without decoding payloads.
    pub fn event_types(&self, stream_id: &StreamId) -> Result<Vec<&'static str>, EventStoreError> {
        let streams = self.streams.lock().map_err(|_| EventStoreError::StoreFailure {
            operation: Operation::ReadStream,
        })?;

        Ok(streams
            .get(stream_id)
            .map(|events| events.iter().map(|event| event.event_type).collect())
            .unwrap_or_default())
    }
}

impl EventStore for InMemoryEventStore {
    #[instrument(name = "memory.read_stream", skip(self))]
    async fn read_stream<E: Event>(
        &self,
        stream_id: StreamId,
    ) -> Result<EventStreamReader<E>, EventStoreError> {
        let payloads: Vec<Value> = {
            let streams = self.streams.lock().map_err(|_| EventStoreError::StoreFailure {
                operation: Operation::ReadStream,
            })?;
            streams
                .get(&stream_id)
                .map(|events| events.iter().map(|event| event.event_data.clone()).collect())
                .unwrap_or_default()
        };

        debug!(
            stream = %stream_id,
            event_count = payloads.len(),
            "[memory.read_stream] loaded stream"
        );

        let events = payloads
            .into_iter()
            .map(|payload| {
                serde_json::from_value(payload).map_err(|error| {
                    EventStoreError::DeserializationFailed {
                        stream_id: stream_id.clone(),
                        detail: error.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<E>, _>>()?;

        Ok(EventStreamReader::new(events))
    }

    #[instrument(name = "memory.append_events", skip(self, writes))]
    async fn append_events(
        &self,
        writes: StreamWrites,
    ) -> Result<EventStreamSlice, EventStoreError> {
        let expected_versions = writes.expected_versions().clone();
        let entries = writes.into_entries();

        let mut streams = self.streams.lock().map_err(|_| EventStoreError::StoreFailure {
            operation: Operation::AppendEvents,
        })?;

        // Check all version constraints before writing any events
        for (stream_id, expected_version) in &expected_versions {
            let current_version =
                StreamVersion::new(streams.get(stream_id).map_or(0, Vec::len));

            if current_version != *expected_version {
                warn!(
                    stream = %stream_id,
                    expected = %expected_version,
                    current = %current_version,
                    "[memory.append_events] version conflict"
                );
                return Err(EventStoreError::VersionConflict);
            }
        }

        let appended = entries.len();
        for StreamWriteEntry {
            stream_id,
            event_type,
            event_data,
        } in entries
        {
            streams.entry(stream_id).or_default().push(StoredEvent {
                event_type,
                event_data,
            });
        }

        let versions: HashMap<StreamId, StreamVersion> = expected_versions
            .into_keys()
            .map(|stream_id| {
                let version = StreamVersion::new(streams.get(&stream_id).map_or(0, Vec::len));
                (stream_id, version)
            })
            .collect();

        info!(
            stream_count = versions.len(),
            event_count = appended,
            "[memory.append_events] appended events"
        );

        Ok(EventStreamSlice::new(versions, appended))
    }
}
