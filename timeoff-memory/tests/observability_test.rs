use serde::{Deserialize, Serialize};
use timeoff_memory::InMemoryEventStore;
use timeoff_types::{Event, EventStore, StreamId, StreamVersion, StreamWrites};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Marker {
    stream_id: StreamId,
}

impl Event for Marker {
    fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    fn event_type_name(&self) -> &'static str {
        "Marker"
    }
}

#[tokio::test]
#[tracing_test::traced_test]
async fn store_operations_emit_named_spans() {
    // Given: An in-memory store and a stream for one employee
    let store = InMemoryEventStore::new();
    let stream_id = StreamId::try_new("employee-observed").expect("valid stream id");

    // When: An event is appended and the stream is read back
    let writes = StreamWrites::new()
        .register_stream(stream_id.clone(), StreamVersion::initial())
        .and_then(|writes| {
            writes.append(&Marker {
                stream_id: stream_id.clone(),
            })
        })
        .expect("writes should build");
    let _ = store.append_events(writes).await.expect("append succeeds");
    let reader = store
        .read_stream::<Marker>(stream_id)
        .await
        .expect("read succeeds");

    // Then: Both operations are recorded under their span names
    assert_eq!(reader.len(), 1);
    assert!(logs_contain("memory.append_events"));
    assert!(logs_contain("memory.read_stream"));

    // And: The read reports which stream it loaded
    assert!(logs_contain("employee-observed"));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn version_conflicts_are_logged_as_warnings() {
    // Given: A stream that already holds one event
    let store = InMemoryEventStore::new();
    let stream_id = StreamId::try_new("employee-contended").expect("valid stream id");
    let marker = Marker {
        stream_id: stream_id.clone(),
    };
    let seed = StreamWrites::new()
        .register_stream(stream_id.clone(), StreamVersion::initial())
        .and_then(|writes| writes.append(&marker))
        .expect("writes should build");
    let _ = store.append_events(seed).await.expect("seed append");

    // When: A writer appends with a stale expected version
    let stale = StreamWrites::new()
        .register_stream(stream_id, StreamVersion::initial())
        .and_then(|writes| writes.append(&marker))
        .expect("writes should build");
    let result = store.append_events(stale).await;

    // Then: The conflict is reported and logged
    assert!(result.is_err());
    assert!(logs_contain("version conflict"));
}
