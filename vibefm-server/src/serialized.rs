//! All schemas that are exposed from endpoints are defined here
//! along with the [ToSerialized] impls

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vibefm_collab::{
    ChatMessage as CollabChatMessage, ChatMode as CollabChatMode, DjMode as CollabDjMode,
    PlaybackReport, QueuedTrack, RoomDetails, RoomSettings as CollabRoomSettings, RoomSnapshot,
    RoomSummary as CollabRoomSummary, SkipVote, UserData,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DjMode {
    Rotation,
    Host,
    Collaborative,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    Normal,
    Emoji,
    Slow,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    dj_mode: DjMode,
    chat_mode: ChatMode,
    vote_to_skip: bool,
    ambient_mode: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    id: String,
    name: String,
    description: Option<String>,
    theme: Option<String>,
    settings: RoomSettings,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: String,
    name: String,
    description: Option<String>,
    theme: Option<String>,
    settings: RoomSettings,
    queue: Vec<QueueItem>,
    current_track: Option<QueueItem>,
    users: Vec<User>,
    messages: Vec<ChatMessage>,
    playback: Option<Playback>,
    skip_votes: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    id: String,
    name: String,
    description: Option<String>,
    theme: Option<String>,
    settings: RoomSettings,
    user_count: usize,
    current_track: Option<QueueItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: String,
    name: String,
    joined_at: DateTime<Utc>,
    is_dj: bool,
}

/// A track in a room's queue
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    video_id: String,
    title: String,
    channel: String,
    thumbnail: Option<String>,
    added_by: String,
    added_by_name: String,
    added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    id: String,
    text: String,
    user_id: String,
    user_name: String,
    timestamp: DateTime<Utc>,
}

/// The last player state reported by the DJ
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Playback {
    /// A YouTube player state code
    state: i8,
    /// The position of the player, in seconds
    timestamp: f64,
    reported_by: String,
    reported_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub user: User,
    pub room: Room,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueState {
    pub queue: Vec<QueueItem>,
    pub current_track: Option<QueueItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResult {
    pub track: QueueItem,
    pub queue: Vec<QueueItem>,
    pub current_track: Option<QueueItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResult {
    pub message: ChatMessage,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkipResult {
    votes: usize,
    required: usize,
    skipped: bool,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl<I, O> ToSerialized<Option<O>> for Option<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Option<O> {
        self.as_ref().map(|x| x.to_serialized())
    }
}

impl From<DjMode> for CollabDjMode {
    fn from(value: DjMode) -> Self {
        match value {
            DjMode::Rotation => Self::Rotation,
            DjMode::Host => Self::Host,
            DjMode::Collaborative => Self::Collaborative,
        }
    }
}

impl From<ChatMode> for CollabChatMode {
    fn from(value: ChatMode) -> Self {
        match value {
            ChatMode::Normal => Self::Normal,
            ChatMode::Emoji => Self::Emoji,
            ChatMode::Slow => Self::Slow,
        }
    }
}

impl ToSerialized<RoomSettings> for CollabRoomSettings {
    fn to_serialized(&self) -> RoomSettings {
        RoomSettings {
            dj_mode: match self.dj_mode {
                CollabDjMode::Rotation => DjMode::Rotation,
                CollabDjMode::Host => DjMode::Host,
                CollabDjMode::Collaborative => DjMode::Collaborative,
            },
            chat_mode: match self.chat_mode {
                CollabChatMode::Normal => ChatMode::Normal,
                CollabChatMode::Emoji => ChatMode::Emoji,
                CollabChatMode::Slow => ChatMode::Slow,
            },
            vote_to_skip: self.vote_to_skip,
            ambient_mode: self.ambient_mode,
        }
    }
}

impl ToSerialized<RoomInfo> for RoomDetails {
    fn to_serialized(&self) -> RoomInfo {
        RoomInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            theme: self.theme.clone(),
            settings: self.settings.to_serialized(),
        }
    }
}

impl ToSerialized<Room> for RoomSnapshot {
    fn to_serialized(&self) -> Room {
        let details = &self.details;

        Room {
            id: details.id.clone(),
            name: details.name.clone(),
            description: details.description.clone(),
            theme: details.theme.clone(),
            settings: details.settings.to_serialized(),
            queue: self.queue.to_serialized(),
            current_track: self.current_track.to_serialized(),
            users: self.users.to_serialized(),
            messages: self.messages.to_serialized(),
            playback: self.playback.to_serialized(),
            skip_votes: self.skip_votes,
        }
    }
}

impl ToSerialized<RoomSummary> for CollabRoomSummary {
    fn to_serialized(&self) -> RoomSummary {
        let details = &self.details;

        RoomSummary {
            id: details.id.clone(),
            name: details.name.clone(),
            description: details.description.clone(),
            theme: details.theme.clone(),
            settings: details.settings.to_serialized(),
            user_count: self.user_count,
            current_track: self.current_track.to_serialized(),
        }
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            joined_at: self.joined_at,
            is_dj: self.is_dj,
        }
    }
}

impl ToSerialized<QueueItem> for QueuedTrack {
    fn to_serialized(&self) -> QueueItem {
        QueueItem {
            video_id: self.track.video_id.clone(),
            title: self.track.title.clone(),
            channel: self.track.channel.clone(),
            thumbnail: self.track.thumbnail.clone(),
            added_by: self.added_by.clone(),
            added_by_name: self.added_by_name.clone(),
            added_at: self.added_at,
        }
    }
}

impl ToSerialized<ChatMessage> for CollabChatMessage {
    fn to_serialized(&self) -> ChatMessage {
        ChatMessage {
            id: self.id.clone(),
            text: self.text.clone(),
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl ToSerialized<Playback> for PlaybackReport {
    fn to_serialized(&self) -> Playback {
        Playback {
            state: self.state.code(),
            timestamp: self.position,
            reported_by: self.reported_by.clone(),
            reported_at: self.reported_at,
        }
    }
}

impl ToSerialized<SkipResult> for SkipVote {
    fn to_serialized(&self) -> SkipResult {
        SkipResult {
            votes: self.votes,
            required: self.required,
            skipped: self.skipped_to.is_some(),
        }
    }
}
