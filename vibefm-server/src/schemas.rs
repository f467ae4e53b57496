use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::Validate;
use vibefm_collab::{NewRoom, PlayerState, RoomSettings, Track};

use crate::{
    errors::ServerError,
    serialized::{ChatMode, DjMode},
};

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoomSchema {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[validate(length(max = 64))]
    pub theme: Option<String>,
    pub dj_mode: Option<DjMode>,
    pub chat_mode: Option<ChatMode>,
    pub vote_to_skip: Option<bool>,
    pub ambient_mode: Option<bool>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSchema {
    #[validate(length(min = 1, max = 64))]
    pub user_name: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSchema {
    #[validate(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Clone, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSchema {
    #[validate(length(min = 1, max = 64))]
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueSchema {
    #[validate(nested)]
    pub track: TrackSchema,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSchema {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[validate(length(min = 1))]
    pub user_id: String,
    pub user_name: Option<String>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSchema {
    #[validate(length(min = 1))]
    pub user_id: String,
    /// A YouTube player state code
    pub state: i8,
    /// The position of the player, in seconds
    #[validate(range(min = 0.0))]
    pub timestamp: f64,
}

impl From<NewRoomSchema> for NewRoom {
    fn from(value: NewRoomSchema) -> Self {
        let defaults = RoomSettings::default();

        Self {
            name: value.name,
            description: value.description,
            theme: value.theme,
            settings: RoomSettings {
                dj_mode: value.dj_mode.map(Into::into).unwrap_or(defaults.dj_mode),
                chat_mode: value.chat_mode.map(Into::into).unwrap_or(defaults.chat_mode),
                vote_to_skip: value.vote_to_skip.unwrap_or(defaults.vote_to_skip),
                ambient_mode: value.ambient_mode.unwrap_or(defaults.ambient_mode),
            },
        }
    }
}

impl From<TrackSchema> for Track {
    fn from(value: TrackSchema) -> Self {
        Self {
            video_id: value.video_id,
            title: value.title,
            channel: value.channel,
            thumbnail: value.thumbnail,
        }
    }
}

/// Parses a YouTube player state code
pub fn player_state(code: i8) -> Result<PlayerState, ServerError> {
    PlayerState::try_from(code).map_err(ServerError::BadRequest)
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;

        value
            .validate()
            .map_err(|e| ServerError::BadRequest(format!("Request body is invalid: {}", e)))?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod test {
    use validator::Validate;
    use vibefm_collab::{ChatMode, DjMode, NewRoom};

    use super::{EnqueueSchema, NewRoomSchema};

    #[test]
    fn room_settings_fall_back_to_defaults() {
        let schema: NewRoomSchema = serde_json::from_str(
            r#"{ "name": "Study Beats", "djMode": "host", "voteToSkip": false }"#,
        )
        .unwrap();

        let new_room = NewRoom::from(schema);

        assert_eq!(new_room.settings.dj_mode, DjMode::Host);
        assert_eq!(new_room.settings.chat_mode, ChatMode::Normal);
        assert!(!new_room.settings.vote_to_skip);
        assert!(new_room.settings.ambient_mode);
    }

    #[test]
    fn tracks_need_a_video_id() {
        let schema: EnqueueSchema =
            serde_json::from_str(r#"{ "track": { "videoId": "" } }"#).unwrap();

        assert!(schema.validate().is_err());

        let schema: EnqueueSchema =
            serde_json::from_str(r#"{ "track": { "videoId": "jfKfPfyJRdk" } }"#).unwrap();

        assert!(schema.validate().is_ok());
    }
}
