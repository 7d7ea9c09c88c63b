use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::{
    dao::models::RosterEntryEntity,
    dto::{
        occupancy::OccupancyResponse,
        sse::{EntryCommittedEvent, OccupancyEvent, ServerEvent},
    },
    state::{SharedState, SseHub},
};

/// Subscribe to one game's live event stream.
pub fn subscribe(state: &SharedState, game_id: Uuid) -> broadcast::Receiver<ServerEvent> {
    state.game_events(game_id).subscribe()
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    game_id: Uuid,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive;
                            // the next occupancy broadcast carries full state.
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!(%game_id, "game SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Push a fresh occupancy snapshot onto a game's stream.
pub fn broadcast_occupancy(hub: &SseHub, game_id: Uuid, occupancy: OccupancyResponse) {
    if let Ok(event) = ServerEvent::json(
        Some("occupancy".to_string()),
        &OccupancyEvent { game_id, occupancy },
    ) {
        hub.broadcast(event);
    }
}

/// Announce a newly committed roster entry on a game's stream.
pub fn broadcast_entry_committed(hub: &SseHub, game_id: Uuid, entry: &RosterEntryEntity) {
    if let Ok(event) = ServerEvent::json(
        Some("entry_committed".to_string()),
        &EntryCommittedEvent {
            game_id,
            name: entry.name.clone(),
            spots: entry.spots,
        },
    ) {
        hub.broadcast(event);
    }
}
