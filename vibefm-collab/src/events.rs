use crossbeam::channel::{Receiver, Sender};

use crate::{ChatMessage, PlayerState, QueuedTrack, RoomDetails, RoomId, UserData, UserId};

pub type EventSender = Sender<CollabEvent>;
pub type EventReceiver = Receiver<CollabEvent>;

/// Events emitted by rooms whenever their state changes
#[derive(Debug, Clone)]
pub enum CollabEvent {
    /// A room was configured
    RoomUpdated { room_id: RoomId, details: RoomDetails },
    /// A user joined a room
    UserJoined { room_id: RoomId, user: UserData },
    /// A user left a room
    UserLeft { room_id: RoomId, user_id: UserId },
    /// The DJ role was handed to another user
    DjChanged { room_id: RoomId, user: UserData },
    /// A chat message was posted
    NewMessage {
        room_id: RoomId,
        message: ChatMessage,
    },
    /// The queue or the current track changed
    QueueUpdated {
        room_id: RoomId,
        queue: Vec<QueuedTrack>,
        current_track: Option<QueuedTrack>,
    },
    /// The DJ reported the state of their player
    PlayerSync {
        room_id: RoomId,
        /// The DJ that reported the state
        from: UserId,
        state: PlayerState,
        /// The position of the player, in seconds.
        position: f64,
    },
    /// Someone voted to skip the current track
    SkipVoteUpdate {
        room_id: RoomId,
        votes: usize,
        /// How many votes are needed before the track is skipped
        required: usize,
    },
}

impl CollabEvent {
    /// The room this event happened in
    pub fn room_id(&self) -> &str {
        match self {
            Self::RoomUpdated { room_id, .. }
            | Self::UserJoined { room_id, .. }
            | Self::UserLeft { room_id, .. }
            | Self::DjChanged { room_id, .. }
            | Self::NewMessage { room_id, .. }
            | Self::QueueUpdated { room_id, .. }
            | Self::PlayerSync { room_id, .. }
            | Self::SkipVoteUpdate { room_id, .. } => room_id,
        }
    }

    /// The user that caused this event and should not receive it, if any.
    pub fn excluded_user(&self) -> Option<&str> {
        match self {
            Self::UserJoined { user, .. } => Some(&user.id),
            Self::PlayerSync { from, .. } => Some(from),
            _ => None,
        }
    }
}
