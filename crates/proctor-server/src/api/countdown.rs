//! Live next-exam countdown over server-sent events.
//!
//! Each connection gets a supervisor task that owns a [`CountdownTicker`]
//! for the user's next exam. The stream emits a `next-exam` event whenever
//! the target changes and a `countdown` event per tick. The ticker is
//! re-armed when the target is reached or any exam changes, and dropped
//! when the client goes away.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use futures::Stream;
use proctor_shared::countdown::CountdownTicker;
use proctor_shared::schedule::Countdown;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{authorize_user, AppState};
use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::services::schedule::{self, ExamView};

const OUTBOUND_BUFFER: usize = 16;

pub async fn stream(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let user = {
        let db = state.db.lock().await;
        authorize_user(&*db, &auth, &user_id)?
    };

    let (out_tx, out_rx) = mpsc::channel(OUTBOUND_BUFFER);
    tokio::spawn(supervise(state, user.id, out_tx));

    let events = futures::stream::unfold(out_rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn json_event<T: Serialize>(name: &str, data: &T) -> Option<Event> {
    match Event::default().event(name).json_data(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, event = name, "failed to encode countdown event");
            None
        }
    }
}

async fn next_exam(state: &AppState, user_id: Uuid) -> Result<Option<ExamView>, ApiError> {
    let db = state.db.lock().await;
    schedule::next_exam_for_user(&*db, &user_id.to_string(), Utc::now())
}

/// `false` once the client has disconnected.
async fn emit(out: &mpsc::Sender<Event>, event: Option<Event>) -> bool {
    match event {
        Some(event) => out.send(event).await.is_ok(),
        None => true,
    }
}

async fn supervise(state: AppState, user_id: Uuid, out: mpsc::Sender<Event>) {
    let mut changes = state.exam_changes.subscribe();
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<Option<Countdown>>();

    debug!(user_id = %user_id, "countdown stream opened");

    loop {
        // ticks queued by the previous ticker are stale
        while tick_rx.try_recv().is_ok() {}

        let next = match next_exam(&state, user_id).await {
            Ok(next) => next,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "countdown stream aborted");
                return;
            }
        };

        if !emit(&out, json_event("next-exam", &next)).await {
            break;
        }

        let _ticker = next.as_ref().map(|view| {
            let tx = tick_tx.clone();
            CountdownTicker::spawn(view.exam.start_time, move |countdown| {
                // receiver lives as long as this task
                let _ = tx.send(countdown);
            })
        });

        let rearm = loop {
            tokio::select! {
                _ = out.closed() => break false,
                tick = tick_rx.recv() => match tick {
                    Some(Some(countdown)) => {
                        if !emit(&out, json_event("countdown", &countdown)).await {
                            break false;
                        }
                    }
                    Some(None) => break true,
                    None => break false,
                },
                change = changes.recv() => match change {
                    Ok(_) | Err(RecvError::Lagged(_)) => break true,
                    Err(RecvError::Closed) => break false,
                },
            }
        };

        if !rearm {
            break;
        }
    }

    debug!(user_id = %user_id, "countdown stream closed");
}
