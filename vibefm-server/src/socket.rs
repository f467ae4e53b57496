use std::{future, sync::Arc};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
};
use futures_util::StreamExt;
use log::{debug, warn};
use serde::Deserialize;
use validator::Validate;
use vibefm_collab::{Author, Room, RoomError, UserData};

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    events::ServerEvent,
    hub::SubscriptionHandle,
    schemas::{player_state, TrackSchema},
    serialized::ToSerialized,
    Router,
};

/// Commands a client sends over the socket
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ClientEvent {
    JoinRoom {
        #[serde(rename = "userName")]
        user_name: String,
    },
    SendMessage {
        message: String,
    },
    AddTrack {
        track: TrackSchema,
    },
    PlayerStateChanged {
        state: i8,
        timestamp: f64,
    },
    NextTrack,
    VoteSkip,
}

/// A user that joined through the socket, along with their event subscription
struct Session {
    user: UserData,
    events: SubscriptionHandle,
}

async fn socket(
    ws: WebSocketUpgrade,
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
) -> ServerResult<Response> {
    let room = context.collab.rooms.get_or_create(&room_id)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, context, room)))
}

async fn handle_socket(mut socket: WebSocket, context: ServerContext, room: Arc<Room>) {
    let mut session: Option<Session> = None;

    loop {
        tokio::select! {
            Some(event) = next_event(&mut session) => {
                if !send(&mut socket, &event).await {
                    break;
                }
            }
            message = socket.recv() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };

                let reply = match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(command) => handle_command(command, &context, &room, &mut session),
                    Err(e) => Err(ServerError::BadRequest(format!("Unknown command: {}", e))),
                };

                let reply = reply.unwrap_or_else(|e| {
                    Some(ServerEvent::Error {
                        message: e.to_string(),
                    })
                });

                if let Some(reply) = reply {
                    if !send(&mut socket, &reply).await {
                        break;
                    }
                }
            }
        }
    }

    end_session(&room, session);
}

/// Removes the user of a closed socket from the room, and drops their subscription
fn end_session(room: &Room, session: Option<Session>) {
    let Some(Session { user, events }) = session else {
        return;
    };

    drop(events);
    debug!("Socket of {} closed", user.name);

    // The user may already have been removed over HTTP
    if let Err(e) = room.leave(&user.id) {
        debug!("Could not remove {}: {}", user.name, e);
    }
}

/// Performs a command, returning a reply for the sender only
fn handle_command(
    command: ClientEvent,
    context: &ServerContext,
    room: &Room,
    session: &mut Option<Session>,
) -> ServerResult<Option<ServerEvent>> {
    if let ClientEvent::JoinRoom { user_name } = command {
        if session.is_some() {
            return Err(ServerError::BadRequest("Already joined".to_string()));
        }

        let user = room.join(&user_name)?;

        // Subscribe before taking the snapshot, so no change falls in between
        let events = context.hub.subscribe(room.id(), Some(user.id.clone()));
        let snapshot = room.snapshot();

        let reply = ServerEvent::RoomJoined {
            user: user.to_serialized(),
            room: snapshot.to_serialized(),
        };

        *session = Some(Session { user, events });
        return Ok(Some(reply));
    }

    let user = &session.as_ref().ok_or(RoomError::UserNotInRoom)?.user;

    match command {
        ClientEvent::JoinRoom { .. } => {}
        ClientEvent::SendMessage { message } => {
            room.post_message(&message, Author::from(user))?;
        }
        ClientEvent::AddTrack { track } => {
            track
                .validate()
                .map_err(|e| ServerError::BadRequest(format!("Track is invalid: {}", e)))?;

            room.enqueue(track.into(), Author::from(user))?;
        }
        ClientEvent::PlayerStateChanged { state, timestamp } => {
            room.report_playback(&user.id, player_state(state)?, timestamp)?;
        }
        ClientEvent::NextTrack => {
            room.advance(&user.id)?;
        }
        ClientEvent::VoteSkip => {
            room.vote_skip(&user.id)?;
        }
    }

    Ok(None)
}

/// Waits for the next room event, or forever if the socket has not joined yet
async fn next_event(session: &mut Option<Session>) -> Option<ServerEvent> {
    match session {
        Some(session) => session.events.next().await,
        None => future::pending().await,
    }
}

async fn send(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!("Could not serialize event: {}", e);
            return true;
        }
    };

    socket.send(Message::Text(text)).await.is_ok()
}

pub fn router() -> Router {
    Router::new().route("/:id/socket", get(socket))
}
