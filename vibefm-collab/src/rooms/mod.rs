mod room;

use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::{slugify, CollabContext, NewRoom, RoomDetails, RoomSummary};

pub use room::*;

pub struct RoomManager {
    context: CollabContext,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("User is not in this room")]
    UserNotInRoom,
    #[error("Only the DJ can do that")]
    NotDj,
    #[error("Vote to skip is disabled in this room")]
    VoteToSkipDisabled,
    #[error("Nothing is playing")]
    NothingPlaying,
    #[error("{0}")]
    ChatRestricted(&'static str),
}

impl RoomManager {
    pub fn new(context: &CollabContext) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Returns the room with the given id, creating it if nobody referenced it before.
    pub fn get_or_create(&self, room_id: &str) -> Result<Arc<Room>, RoomError> {
        let room_id = room_id.trim();

        if room_id.is_empty() {
            return Err(RoomError::InvalidInput("Room ID is required"));
        }

        let room = self
            .context
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                info!("Creating room {}", room_id);
                Arc::new(Room::new(&self.context, RoomDetails::unconfigured(room_id)))
            })
            .clone();

        Ok(room)
    }

    /// Returns the room if it exists
    pub fn room(&self, room_id: &str) -> Option<Arc<Room>> {
        self.context.rooms.get(room_id).map(|r| r.clone())
    }

    /// Creates or updates the room whose id is derived from the given name.
    pub fn configure(&self, new_room: NewRoom) -> Result<Arc<Room>, RoomError> {
        let slug = slugify(&new_room.name);

        if slug.is_empty() {
            return Err(RoomError::InvalidInput("Room name is required"));
        }

        let room = self.get_or_create(&slug)?;

        let details = RoomDetails {
            id: slug,
            name: new_room.name.trim().to_string(),
            description: new_room.description,
            theme: new_room.theme,
            settings: new_room.settings,
        };

        room.update_details(details);
        Ok(room)
    }

    /// Summaries of every room, ordered by id
    pub fn list_all(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<_> = self
            .context
            .rooms
            .iter()
            .map(|r| r.value().clone())
            .collect();

        rooms.sort_by(|a, b| a.id().cmp(b.id()));
        rooms.iter().map(|r| r.summary()).collect()
    }
}
