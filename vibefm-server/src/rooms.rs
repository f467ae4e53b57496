use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json,
};
use log::info;
use vibefm_collab::NewRoom;

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{
        player_state, EnqueueSchema, JoinSchema, MessageSchema, NewRoomSchema, PlaybackSchema,
        UserSchema, ValidatedJson,
    },
    serialized::{
        EnqueueResult, JoinResult, MessageResult, QueueState, Room, RoomInfo, RoomSummary,
        SkipResult, ToSerialized, User,
    },
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/rooms",
    tag = "rooms",
    responses(
        (status = 200, body = Vec<RoomSummary>)
    )
)]
pub async fn list_rooms(State(context): State<ServerContext>) -> Json<Vec<RoomSummary>> {
    Json(context.collab.rooms.list_all().to_serialized())
}

#[utoipa::path(
    post,
    path = "/v1/rooms",
    tag = "rooms",
    request_body = NewRoomSchema,
    responses(
        (status = 200, body = RoomInfo, description = "The room was created or updated")
    )
)]
pub async fn configure_room(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewRoomSchema>,
) -> ServerResult<Json<RoomInfo>> {
    let room = context.collab.rooms.configure(NewRoom::from(body))?;

    Ok(Json(room.snapshot().details.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/rooms/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    responses(
        (status = 200, body = Room)
    )
)]
pub async fn room(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
) -> ServerResult<Json<Room>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;

    Ok(Json(room.snapshot().to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/join",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    request_body = JoinSchema,
    responses(
        (status = 200, body = JoinResult, description = "A new user was added to the room")
    )
)]
pub async fn join(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<JoinSchema>,
) -> ServerResult<Json<JoinResult>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    let user = room.join(&body.user_name)?;

    Ok(Json(JoinResult {
        user: user.to_serialized(),
        room: room.snapshot().to_serialized(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/leave",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    request_body = UserSchema,
    responses(
        (status = 200, body = User, description = "The user that left"),
        (status = 404, description = "The user is not in the room")
    )
)]
pub async fn leave(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UserSchema>,
) -> ServerResult<Json<User>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    let user = room.leave(&body.user_id)?;

    Ok(Json(user.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/queue",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    request_body = EnqueueSchema,
    responses(
        (status = 200, body = EnqueueResult, description = "The track was added to the queue")
    )
)]
pub async fn enqueue(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<EnqueueSchema>,
) -> ServerResult<Json<EnqueueResult>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    let author = room.author(body.user_id, body.user_name);
    let track = room.enqueue(body.track.into(), author)?;

    let snapshot = room.snapshot();

    Ok(Json(EnqueueResult {
        track: track.to_serialized(),
        queue: snapshot.queue.to_serialized(),
        current_track: snapshot.current_track.to_serialized(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/next",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    request_body = UserSchema,
    responses(
        (status = 200, body = QueueState, description = "The room moved on to the next track"),
        (status = 403, description = "The user is not allowed to control playback")
    )
)]
pub async fn next_track(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UserSchema>,
) -> ServerResult<Json<QueueState>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    room.advance(&body.user_id)?;

    let snapshot = room.snapshot();

    Ok(Json(QueueState {
        queue: snapshot.queue.to_serialized(),
        current_track: snapshot.current_track.to_serialized(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/messages",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    request_body = MessageSchema,
    responses(
        (status = 200, body = MessageResult, description = "The message was posted")
    )
)]
pub async fn post_message(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<MessageSchema>,
) -> ServerResult<Json<MessageResult>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    let author = room.author(Some(body.user_id), body.user_name);
    let message = room.post_message(&body.message, author)?;

    Ok(Json(MessageResult {
        message: message.to_serialized(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/playback",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    request_body = PlaybackSchema,
    responses(
        (status = 204, description = "The playback state was relayed to the room"),
        (status = 403, description = "Only the DJ reports playback")
    )
)]
pub async fn report_playback(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<PlaybackSchema>,
) -> ServerResult<StatusCode> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    let state = player_state(body.state)?;

    room.report_playback(&body.user_id, state, body.timestamp)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/rooms/{id}/skip",
    tag = "rooms",
    params(("id" = String, Path, description = "The room id")),
    request_body = UserSchema,
    responses(
        (status = 200, body = SkipResult, description = "The vote was counted")
    )
)]
pub async fn vote_skip(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UserSchema>,
) -> ServerResult<Json<SkipResult>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    let vote = room.vote_skip(&body.user_id)?;

    if vote.skipped_to.is_some() {
        info!("Room {} voted to skip", room.id());
    }

    Ok(Json(vote.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_rooms).post(configure_room))
        .route("/:id", get(room))
        .route("/:id/join", post(join))
        .route("/:id/leave", post(leave))
        .route("/:id/queue", post(enqueue))
        .route("/:id/next", post(next_track))
        .route("/:id/messages", post(post_message))
        .route("/:id/playback", post(report_playback))
        .route("/:id/skip", post(vote_skip))
}
