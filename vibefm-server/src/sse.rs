use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    routing::get,
};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{context::ServerContext, errors::ServerResult, Router};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventStreamQuery {
    /// Events caused by this user are not sent
    user_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/v1/rooms/{id}/events",
    tag = "events",
    params(
        ("id" = String, Path, description = "The room id"),
        EventStreamQuery
    ),
    responses(
        (
            status = 200,
            content_type = "text/event-stream",
            description = "A stream of events from the room",
            body = crate::events::ServerEvent
        )
    )
)]
pub async fn event_stream(
    State(context): State<ServerContext>,
    Path(room_id): Path<String>,
    Query(query): Query<EventStreamQuery>,
) -> ServerResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let room = context.collab.rooms.get_or_create(&room_id)?;
    let subscription = context.hub.subscribe(room.id(), query.user_id);

    let stream = subscription.map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(Event::default().data(data))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub fn router() -> Router {
    Router::new().route("/:id/events", get(event_stream))
}
