use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;

use crate::AppState;
use crate::enrichment::ThoughtEvent;
use crate::security::UserContext;

fn to_sse_event(event: &ThoughtEvent) -> Event {
    let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    Event::default().event("thought").data(json)
}

/// GET /api/thoughts/events - Live stream of the caller's thought changes.
///
/// Lagging subscribers silently skip the events they missed; clients can
/// re-list thoughts to resync.
pub async fn stream_thought_events(
    State(state): State<AppState>,
    user: UserContext,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let owner_id = user.user_id;
    tracing::debug!(owner_id = %owner_id, "Thought event stream opened");

    let rx = state.notes.feed().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |res| {
        let event = match res {
            Ok(event) if event.owner_id == owner_id => Some(Ok(to_sse_event(&event))),
            _ => None,
        };
        futures::future::ready(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
