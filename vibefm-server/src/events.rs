use serde::Serialize;
use utoipa::ToSchema;
use vibefm_collab::{CollabEvent, RoomId, UserId};

use crate::serialized::{ChatMessage, QueueItem, Room, RoomInfo, ToSerialized, User};

/// Events pushed to clients over the event stream and the socket
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ServerEvent {
    /// Sent only to the user that joined, with the full state of the room.
    RoomJoined { user: User, room: Room },
    /// The room was configured
    RoomUpdated { room: RoomInfo },
    /// Someone else joined the room
    UserJoined { user: User },
    /// A user left the room
    UserLeft {
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Another user is now the DJ
    DjChanged { user: User },
    /// A chat message was posted
    NewMessage { message: ChatMessage },
    /// The queue or the current track changed
    QueueUpdated {
        queue: Vec<QueueItem>,
        #[serde(rename = "currentTrack")]
        current_track: Option<QueueItem>,
    },
    /// The DJ's player changed state, listeners should follow it
    PlayerSync {
        /// A YouTube player state code
        state: i8,
        /// The position of the DJ's player, in seconds
        timestamp: f64,
    },
    /// Someone voted to skip the current track
    SkipVoteUpdate { votes: usize, required: usize },
    /// A command sent over the socket failed
    Error { message: String },
}

/// A [ServerEvent] along with who should receive it.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub room_id: RoomId,
    /// The user that caused the event, who already knows about it
    pub except: Option<UserId>,
    pub event: ServerEvent,
}

impl From<CollabEvent> for Dispatch {
    fn from(value: CollabEvent) -> Self {
        let room_id = value.room_id().to_string();
        let except = value.excluded_user().map(str::to_string);

        let event = match value {
            CollabEvent::RoomUpdated { details, .. } => ServerEvent::RoomUpdated {
                room: details.to_serialized(),
            },
            CollabEvent::UserJoined { user, .. } => ServerEvent::UserJoined {
                user: user.to_serialized(),
            },
            CollabEvent::UserLeft { user_id, .. } => ServerEvent::UserLeft { user_id },
            CollabEvent::DjChanged { user, .. } => ServerEvent::DjChanged {
                user: user.to_serialized(),
            },
            CollabEvent::NewMessage { message, .. } => ServerEvent::NewMessage {
                message: message.to_serialized(),
            },
            CollabEvent::QueueUpdated {
                queue,
                current_track,
                ..
            } => ServerEvent::QueueUpdated {
                queue: queue.to_serialized(),
                current_track: current_track.to_serialized(),
            },
            CollabEvent::PlayerSync {
                state, position, ..
            } => ServerEvent::PlayerSync {
                state: state.code(),
                timestamp: position,
            },
            CollabEvent::SkipVoteUpdate {
                votes, required, ..
            } => ServerEvent::SkipVoteUpdate { votes, required },
        };

        Self {
            room_id,
            except,
            event,
        }
    }
}
