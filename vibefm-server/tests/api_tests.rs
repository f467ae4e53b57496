//! HTTP API tests, driving the router directly without binding a port.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::time::timeout;
use tower::ServiceExt;
use vibefm_collab::Config;
use vibefm_server::{app, ServerContext};

fn create_test_app() -> Router {
    app(ServerContext::new(Config::default()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    send(app, request).await
}

async fn join(app: &Router, room: &str, name: &str) -> Value {
    let (status, body) = post_json(
        app,
        &format!("/v1/rooms/{}/join", room),
        json!({ "userName": name }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    body["user"].clone()
}

/// Opens the event stream of a room
async fn subscribe(app: &Router, path: &str) -> Body {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    response.into_body()
}

/// Waits for the next event sent over an event stream, skipping keep-alives
async fn next_event(body: &mut Body) -> Value {
    let read = async {
        loop {
            let frame = body.frame().await.unwrap().unwrap();
            let Ok(data) = frame.into_data() else {
                continue;
            };

            let text = String::from_utf8(data.to_vec()).unwrap();
            if let Some(json) = text.trim().strip_prefix("data:") {
                return serde_json::from_str::<Value>(json.trim()).unwrap();
            }
        }
    };

    timeout(Duration::from_secs(5), read).await.unwrap()
}

#[tokio::test]
async fn fetching_a_room_creates_it() {
    let app = create_test_app();

    let (status, body) = get(&app, "/v1/rooms/lofi").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "lofi");
    assert_eq!(body["queue"], json!([]));
    assert_eq!(body["currentTrack"], Value::Null);
    assert_eq!(body["settings"]["djMode"], "rotation");

    let (_, rooms) = get(&app, "/v1/rooms").await;
    assert_eq!(rooms.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn configuring_a_room_uses_its_slug() {
    let app = create_test_app();

    let (status, body) = post_json(
        &app,
        "/v1/rooms",
        json!({
            "name": "Late Night Lofi",
            "theme": "night",
            "chatMode": "slow",
            "voteToSkip": false
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "late-night-lofi");
    assert_eq!(body["settings"]["chatMode"], "slow");
    assert_eq!(body["settings"]["voteToSkip"], false);
    assert_eq!(body["settings"]["ambientMode"], true);

    let (status, body) = post_json(&app, "/v1/rooms", json!({ "description": "no name" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn joining_makes_the_first_user_dj() {
    let app = create_test_app();

    let john = join(&app, "lofi", "john").await;
    let mary = join(&app, "lofi", "mary").await;

    assert_eq!(john["isDj"], true);
    assert_eq!(mary["isDj"], false);

    let (status, _) = post_json(&app, "/v1/rooms/lofi/join", json!({ "userName": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&app, "/v1/rooms/lofi/leave", json!({ "userId": john["id"] })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, room) = get(&app, "/v1/rooms/lofi").await;
    let users = room["users"].as_array().unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], mary["id"]);
    assert_eq!(users[0]["isDj"], true);

    let (status, _) = post_json(&app, "/v1/rooms/lofi/leave", json!({ "userId": john["id"] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn queue_promotes_and_advances() {
    let app = create_test_app();
    let john = join(&app, "lofi", "john").await;
    let mary = join(&app, "lofi", "mary").await;

    let (status, body) = post_json(
        &app,
        "/v1/rooms/lofi/queue",
        json!({
            "track": { "videoId": "jfKfPfyJRdk", "title": "lofi hip hop radio", "channel": "Lofi Girl" },
            "userId": john["id"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentTrack"]["videoId"], "jfKfPfyJRdk");
    assert_eq!(body["currentTrack"]["addedByName"], "john");
    assert_eq!(body["queue"], json!([]));

    let (_, body) = post_json(
        &app,
        "/v1/rooms/lofi/queue",
        json!({ "track": { "videoId": "5qap5aO4i9A" } }),
    )
    .await;

    assert_eq!(body["track"]["addedBy"], "anonymous");
    assert_eq!(body["queue"].as_array().unwrap().len(), 1);

    let (status, _) = post_json(&app, "/v1/rooms/lofi/queue", json!({ "track": { "videoId": "" } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&app, "/v1/rooms/lofi/next", json!({ "userId": mary["id"] })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post_json(&app, "/v1/rooms/lofi/next", json!({ "userId": john["id"] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentTrack"]["videoId"], "5qap5aO4i9A");
    assert_eq!(body["queue"], json!([]));

    // The DJ role rotates by default
    let (_, room) = get(&app, "/v1/rooms/lofi").await;
    assert_eq!(room["users"][1]["isDj"], true);
}

#[tokio::test]
async fn messages_are_posted() {
    let app = create_test_app();
    let john = join(&app, "lofi", "john").await;

    let (status, body) = post_json(
        &app,
        "/v1/rooms/lofi/messages",
        json!({ "message": "hello", "userId": john["id"], "userName": "not john" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["text"], "hello");
    assert_eq!(body["message"]["userName"], "john");

    let (status, _) = post_json(&app, "/v1/rooms/lofi/messages", json!({ "message": "hello" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, room) = get(&app, "/v1/rooms/lofi").await;
    assert_eq!(room["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn playback_is_reported_by_the_dj() {
    let app = create_test_app();
    let john = join(&app, "lofi", "john").await;
    let mary = join(&app, "lofi", "mary").await;

    let (status, _) = post_json(
        &app,
        "/v1/rooms/lofi/playback",
        json!({ "userId": john["id"], "state": 1, "timestamp": 30.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = post_json(
        &app,
        "/v1/rooms/lofi/playback",
        json!({ "userId": mary["id"], "state": 2, "timestamp": 1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_json(
        &app,
        "/v1/rooms/lofi/playback",
        json!({ "userId": john["id"], "state": 7, "timestamp": 1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, room) = get(&app, "/v1/rooms/lofi").await;
    assert_eq!(room["playback"]["state"], 1);
    assert_eq!(room["playback"]["timestamp"], 30.5);
}

#[tokio::test]
async fn votes_skip_the_current_track() {
    let app = create_test_app();
    let john = join(&app, "lofi", "john").await;
    join(&app, "lofi", "mary").await;

    for video_id in ["a", "b"] {
        post_json(
            &app,
            "/v1/rooms/lofi/queue",
            json!({ "track": { "videoId": video_id } }),
        )
        .await;
    }

    let (status, body) = post_json(&app, "/v1/rooms/lofi/skip", json!({ "userId": john["id"] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votes"], 1);
    assert_eq!(body["required"], 2);
    assert_eq!(body["skipped"], false);

    let (status, _) = post_json(&app, "/v1/rooms/lofi/skip", json!({ "userId": "ghost" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_document_is_served() {
    let app = create_test_app();

    let (status, body) = get(&app, "/api.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/rooms/{id}/join"].is_object());
}

#[tokio::test]
async fn events_reach_room_subscribers() {
    let app = create_test_app();
    let mut events = subscribe(&app, "/v1/rooms/lofi/events").await;

    let john = join(&app, "lofi", "john").await;
    let event = next_event(&mut events).await;

    assert_eq!(event["type"], "user_joined");
    assert_eq!(event["user"]["id"], john["id"]);
    assert_eq!(event["user"]["isDj"], true);

    post_json(
        &app,
        "/v1/rooms/lofi/queue",
        json!({ "track": { "videoId": "jfKfPfyJRdk" }, "userId": john["id"] }),
    )
    .await;

    let event = next_event(&mut events).await;

    assert_eq!(event["type"], "queue_updated");
    assert_eq!(event["currentTrack"]["videoId"], "jfKfPfyJRdk");
}

#[tokio::test]
async fn subscribers_do_not_receive_their_own_player_state() {
    let app = create_test_app();
    let john = join(&app, "lofi", "john").await;

    let path = format!("/v1/rooms/lofi/events?userId={}", john["id"].as_str().unwrap());
    let mut events = subscribe(&app, &path).await;

    post_json(
        &app,
        "/v1/rooms/lofi/playback",
        json!({ "userId": john["id"], "state": 1, "timestamp": 12.0 }),
    )
    .await;

    post_json(
        &app,
        "/v1/rooms/lofi/messages",
        json!({ "message": "hello", "userId": john["id"] }),
    )
    .await;

    let event = next_event(&mut events).await;

    assert_eq!(event["type"], "new_message");
    assert_eq!(event["message"]["text"], "hello");
}
