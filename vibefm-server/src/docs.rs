use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::{events, rooms, schemas, serialized, sse};

#[derive(OpenApi)]
#[openapi(
    info(description = "vibefm-server exposes endpoints to listen along in vibefm rooms"),
    paths(
        rooms::list_rooms,
        rooms::configure_room,
        rooms::room,
        rooms::join,
        rooms::leave,
        rooms::enqueue,
        rooms::next_track,
        rooms::post_message,
        rooms::report_playback,
        rooms::vote_skip,
        sse::event_stream,
    ),
    components(schemas(
        serialized::DjMode,
        serialized::ChatMode,
        serialized::RoomSettings,
        serialized::RoomInfo,
        serialized::Room,
        serialized::RoomSummary,
        serialized::User,
        serialized::QueueItem,
        serialized::ChatMessage,
        serialized::Playback,
        serialized::JoinResult,
        serialized::QueueState,
        serialized::EnqueueResult,
        serialized::MessageResult,
        serialized::SkipResult,
        schemas::NewRoomSchema,
        schemas::JoinSchema,
        schemas::UserSchema,
        schemas::TrackSchema,
        schemas::EnqueueSchema,
        schemas::MessageSchema,
        schemas::PlaybackSchema,
        events::ServerEvent,
    )),
    tags(
        (name = "rooms", description = "Room state and the actions listeners take in them"),
        (name = "events", description = "Pushed room events")
    )
)]
pub struct ApiDoc;

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
