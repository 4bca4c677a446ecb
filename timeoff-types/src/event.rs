use crate::store::StreamId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A fact recorded in an event stream.
///
/// Every event knows the stream it belongs to, so a batch of events can be
/// routed to the right stream without the caller repeating the key. Events
/// must round-trip through `serde` because stores persist them as JSON
/// documents and rebuild them on read.
pub trait Event: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The stream this event is appended to.
    fn stream_id(&self) -> &StreamId;

    /// Stable name of the event variant, recorded next to the payload.
    fn event_type_name(&self) -> &'static str;
}
