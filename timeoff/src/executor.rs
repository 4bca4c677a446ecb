//! Read, decide, append.
//!
//! [`execute`] closes the loop the handler leaves open: it persists the
//! decided events with an expected-version check on the owner's stream and
//! retries from a fresh read when another writer got there first.

mod retry;

pub use retry::{BackoffMultiplier, BaseDelayMs, MaxDelayMs, MaxRetries, RetryPolicy};

use timeoff_types::{EventStore, EventStoreError, StreamWrites};
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::command::Command;
use crate::errors::CommandError;
use crate::event::RequestEvent;
use crate::handler::{log_rejection, CommandHandler};
use crate::overlap::OverlapPolicy;

/// Decide `command` and append the resulting events to the owner's stream.
///
/// 1. Read the owner's stream and remember its version.
/// 2. Decide with [`CommandHandler::decide`]; rejections return at once and
///    write nothing.
/// 3. Append the events, expecting the stream to still be at the version
///    read.
/// 4. On [`EventStoreError::VersionConflict`], wait per `policy` and start
///    over. Once the policy's retries are used up the command fails with
///    [`CommandError::ConcurrencyConflict`].
///
/// Any other store error is returned as is.
#[instrument(
    name = "timeoff.execute",
    skip(store, handler, command, policy),
    fields(user = %command.user_id(), command = command.name())
)]
pub async fn execute<S, C, O>(
    store: S,
    handler: &CommandHandler<C, O>,
    command: &Command,
    policy: &RetryPolicy,
) -> Result<Vec<RequestEvent>, CommandError>
where
    S: EventStore,
    C: Clock,
    O: OverlapPolicy,
{
    let user_id = command.user_id();
    let stream_id = user_id.stream_id();
    let mut attempt: u32 = 0;

    loop {
        let history = store.read_stream::<RequestEvent>(stream_id.clone()).await?;
        let expected_version = history.version();

        let events = handler.decide(history.iter(), command).map_err(|violation| {
            log_rejection(command, violation);
            violation
        })?;

        if events.is_empty() {
            debug!(user = %user_id, "[timeoff.execute] nothing to append");
            return Ok(events);
        }

        let writes = StreamWrites::new()
            .register_stream(stream_id.clone(), expected_version)?
            .append_all(&events)?;

        match store.append_events(writes).await {
            Ok(slice) => {
                info!(
                    user = %user_id,
                    command = command.name(),
                    event_count = slice.len(),
                    attempt = attempt + 1,
                    "[timeoff.execute] events appended"
                );
                return Ok(events);
            }
            Err(EventStoreError::VersionConflict) if attempt < policy.retry_limit() => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                warn!(
                    user = %user_id,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "[timeoff.execute] version conflict, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(EventStoreError::VersionConflict) => {
                warn!(
                    user = %user_id,
                    attempts = attempt + 1,
                    "[timeoff.execute] version conflict, retries exhausted"
                );
                return Err(CommandError::ConcurrencyConflict {
                    user_id: user_id.clone(),
                    attempts: attempt + 1,
                });
            }
            Err(error) => return Err(error.into()),
        }
    }
}
