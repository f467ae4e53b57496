use chrono::{DateTime, Utc};

pub type RoomId = String;
pub type UserId = String;
pub type MessageId = String;

/// The user id recorded for tracks and messages submitted without one.
pub const ANONYMOUS_USER_ID: &str = "anonymous";
/// The display name used when an author has none.
pub const ANONYMOUS_USER_NAME: &str = "Anonymous";

/// Who gets to control playback in a room.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DjMode {
    /// The DJ role passes to the next listener after every track.
    #[default]
    Rotation,
    /// The DJ keeps control until they leave.
    Host,
    /// Any listener may skip ahead.
    Collaborative,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    #[default]
    Normal,
    /// Only messages without letters or digits are accepted.
    Emoji,
    /// Each author may post once per slow-mode interval.
    Slow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSettings {
    pub dj_mode: DjMode,
    pub chat_mode: ChatMode,
    pub vote_to_skip: bool,
    pub ambient_mode: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            dj_mode: DjMode::default(),
            chat_mode: ChatMode::default(),
            vote_to_skip: true,
            ambient_mode: true,
        }
    }
}

/// Descriptive data about a room, as configured by its creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDetails {
    pub id: RoomId,
    pub name: String,
    pub description: Option<String>,
    pub theme: Option<String>,
    pub settings: RoomSettings,
}

impl RoomDetails {
    /// The details of a room that was referenced before anyone configured it.
    pub fn unconfigured(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            theme: None,
            settings: RoomSettings::default(),
        }
    }
}

/// Input to [crate::RoomManager::configure].
#[derive(Debug, Clone, Default)]
pub struct NewRoom {
    pub name: String,
    pub description: Option<String>,
    pub theme: Option<String>,
    pub settings: RoomSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub id: UserId,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    pub is_dj: bool,
}

/// A track as described by the client. Catalog lookups happen elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: Option<String>,
}

/// A track that was added to a room, along with who added it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTrack {
    pub track: Track,
    pub added_by: UserId,
    pub added_by_name: String,
    pub added_at: DateTime<Utc>,
}

/// Attribution for something submitted to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
}

impl Author {
    pub fn new(id: Option<String>, name: Option<String>) -> Self {
        Self {
            id: id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS_USER_ID.to_string()),
            name: name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS_USER_NAME.to_string()),
        }
    }
}

impl From<&UserData> for Author {
    fn from(user: &UserData) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub user_id: UserId,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
}

/// The state of an embedded player, using the codes of the YouTube iframe API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    pub fn code(&self) -> i8 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

impl TryFrom<i8> for PlayerState {
    type Error = String;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(Self::Unstarted),
            0 => Ok(Self::Ended),
            1 => Ok(Self::Playing),
            2 => Ok(Self::Paused),
            3 => Ok(Self::Buffering),
            5 => Ok(Self::Cued),
            other => Err(format!("{} is not a valid player state", other)),
        }
    }
}

/// The last playback state reported by the DJ of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackReport {
    pub state: PlayerState,
    /// Playback position in seconds.
    pub position: f64,
    pub reported_by: UserId,
    pub reported_at: DateTime<Utc>,
}

/// Everything a client needs to render a room.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub details: RoomDetails,
    pub queue: Vec<QueuedTrack>,
    pub current_track: Option<QueuedTrack>,
    pub users: Vec<UserData>,
    pub messages: Vec<ChatMessage>,
    pub playback: Option<PlaybackReport>,
    pub skip_votes: usize,
}

/// A condensed view of a room, for listings.
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub details: RoomDetails,
    pub user_count: usize,
    pub current_track: Option<QueuedTrack>,
}

#[cfg(test)]
mod test {
    use super::{Author, PlayerState, ANONYMOUS_USER_ID, ANONYMOUS_USER_NAME};

    #[test]
    fn player_state_codes_match_the_youtube_api() {
        for code in [-1, 0, 1, 2, 3, 5] {
            let state = PlayerState::try_from(code).expect("valid code");
            assert_eq!(state.code(), code);
        }

        assert!(PlayerState::try_from(4i8).is_err());
    }

    #[test]
    fn blank_authors_are_anonymous() {
        let author = Author::new(Some("  ".to_string()), None);

        assert_eq!(author.id, ANONYMOUS_USER_ID);
        assert_eq!(author.name, ANONYMOUS_USER_NAME);
    }
}
