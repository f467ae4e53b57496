use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    util::is_emoji_only, Author, ChatMessage, ChatMode, CollabContext, CollabEvent, DjMode,
    PlaybackReport, PlayerState, QueuedTrack, RoomDetails, RoomId, RoomSnapshot, RoomSummary,
    Track, UserData, UserId,
};

use super::RoomError;

/// A vibefm room, containing listeners, a queue, the current track, and a chat.
///
/// Every operation locks the room state for its whole duration, and emits its
/// event before releasing the lock, so listeners observe events in the same
/// order the state changed.
pub struct Room {
    id: RoomId,
    context: CollabContext,
    state: Mutex<RoomState>,
}

struct RoomState {
    details: RoomDetails,
    queue: VecDeque<QueuedTrack>,
    current_track: Option<QueuedTrack>,
    /// Ordered by join time
    users: Vec<UserData>,
    messages: VecDeque<ChatMessage>,
    playback: Option<PlaybackReport>,
    skip_votes: HashSet<UserId>,
    last_message_at: HashMap<UserId, DateTime<Utc>>,
}

/// The outcome of a skip vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipVote {
    pub votes: usize,
    pub required: usize,
    /// The track that is now playing, if the vote caused a skip
    pub skipped_to: Option<Option<QueuedTrack>>,
}

impl Room {
    pub fn new(context: &CollabContext, details: RoomDetails) -> Self {
        Self {
            id: details.id.clone(),
            context: context.clone(),
            state: Mutex::new(RoomState {
                details,
                queue: Default::default(),
                current_track: None,
                users: Default::default(),
                messages: Default::default(),
                playback: None,
                skip_votes: Default::default(),
                last_message_at: Default::default(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let state = self.state.lock();

        RoomSnapshot {
            details: state.details.clone(),
            queue: state.queue.iter().cloned().collect(),
            current_track: state.current_track.clone(),
            users: state.users.clone(),
            messages: state.messages.iter().cloned().collect(),
            playback: state.playback.clone(),
            skip_votes: state.skip_votes.len(),
        }
    }

    pub fn summary(&self) -> RoomSummary {
        let state = self.state.lock();

        RoomSummary {
            details: state.details.clone(),
            user_count: state.users.len(),
            current_track: state.current_track.clone(),
        }
    }

    /// Returns the user if they are in this room
    pub fn user(&self, user_id: &str) -> Option<UserData> {
        let state = self.state.lock();
        state.user(user_id).cloned()
    }

    /// Attribution for a submission. Members are attributed by their own name.
    pub fn author(&self, user_id: Option<String>, user_name: Option<String>) -> Author {
        let state = self.state.lock();

        user_id
            .as_deref()
            .and_then(|id| state.user(id))
            .map(Author::from)
            .unwrap_or_else(|| Author::new(user_id, user_name))
    }

    pub(super) fn update_details(&self, details: RoomDetails) {
        let mut state = self.state.lock();
        state.details = details.clone();

        info!("Room {} configured", details.name);

        self.context.emit(CollabEvent::RoomUpdated {
            room_id: self.id.clone(),
            details,
        });
    }

    /// Adds a new user to the room. The first user in an empty room becomes the DJ.
    pub fn join(&self, user_name: &str) -> Result<UserData, RoomError> {
        let user_name = user_name.trim();

        if user_name.is_empty() {
            return Err(RoomError::InvalidInput("User name is required"));
        }

        let mut state = self.state.lock();

        let user = UserData {
            id: Uuid::new_v4().to_string(),
            name: user_name.to_string(),
            joined_at: Utc::now(),
            is_dj: state.users.is_empty(),
        };

        state.users.push(user.clone());

        info!("{} joined room {}", user.name, state.details.name);

        self.context.emit(CollabEvent::UserJoined {
            room_id: self.id.clone(),
            user: user.clone(),
        });

        Ok(user)
    }

    /// Removes a user, handing the DJ role to the earliest remaining user if needed.
    pub fn leave(&self, user_id: &str) -> Result<UserData, RoomError> {
        let mut state = self.state.lock();

        let index = state
            .users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or(RoomError::UserNotInRoom)?;

        let user = state.users.remove(index);
        state.skip_votes.remove(user_id);
        state.last_message_at.remove(user_id);

        info!("{} left room {}", user.name, state.details.name);

        if user.is_dj {
            let next_dj = state.users.first_mut().map(|next| {
                next.is_dj = true;
                next.clone()
            });

            if let Some(next_dj) = next_dj {
                self.emit_dj_changed(&state, next_dj);
            }
        }

        self.context.emit(CollabEvent::UserLeft {
            room_id: self.id.clone(),
            user_id: user.id.clone(),
        });

        // Fewer users means fewer votes are needed
        let votes_pending = state.details.settings.vote_to_skip
            && state.current_track.is_some()
            && !state.skip_votes.is_empty();

        if votes_pending {
            self.tally_skip_votes(&mut state);
        }

        Ok(user)
    }

    /// Adds a track to the queue. If nothing is playing, it starts playing right away.
    pub fn enqueue(&self, track: Track, author: Author) -> Result<QueuedTrack, RoomError> {
        if track.video_id.trim().is_empty() {
            return Err(RoomError::InvalidInput("A valid track is required"));
        }

        let mut state = self.state.lock();

        let queued = QueuedTrack {
            track,
            added_by: author.id,
            added_by_name: author.name,
            added_at: Utc::now(),
        };

        debug!(
            "{} queued {} in room {}",
            queued.added_by_name, queued.track.video_id, state.details.name
        );

        state.queue.push_back(queued.clone());

        if state.current_track.is_none() {
            state.promote_next();
        }

        self.emit_queue_update(&state);
        Ok(queued)
    }

    /// Moves on to the next track in the queue, or stops if the queue is empty.
    pub fn advance(&self, user_id: &str) -> Result<Option<QueuedTrack>, RoomError> {
        let mut state = self.state.lock();

        let user = state.user(user_id).ok_or(RoomError::UserNotInRoom)?;

        let can_advance = match state.details.settings.dj_mode {
            DjMode::Collaborative => true,
            DjMode::Rotation | DjMode::Host => user.is_dj,
        };

        if !can_advance {
            return Err(RoomError::NotDj);
        }

        Ok(self.advance_locked(&mut state))
    }

    /// Stores the DJ's player state and relays it to everyone else in the room.
    pub fn report_playback(
        &self,
        user_id: &str,
        player_state: PlayerState,
        position: f64,
    ) -> Result<(), RoomError> {
        if !position.is_finite() || position < 0. {
            return Err(RoomError::InvalidInput("Position must be a positive number"));
        }

        let mut state = self.state.lock();

        let user = state.user(user_id).ok_or(RoomError::UserNotInRoom)?;

        if !user.is_dj {
            return Err(RoomError::NotDj);
        }

        state.playback = Some(PlaybackReport {
            state: player_state,
            position,
            reported_by: user_id.to_string(),
            reported_at: Utc::now(),
        });

        self.context.emit(CollabEvent::PlayerSync {
            room_id: self.id.clone(),
            from: user_id.to_string(),
            state: player_state,
            position,
        });

        Ok(())
    }

    /// Posts a chat message, keeping only the most recent messages.
    pub fn post_message(&self, text: &str, author: Author) -> Result<ChatMessage, RoomError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(RoomError::InvalidInput("Message is required"));
        }

        let mut state = self.state.lock();
        let now = Utc::now();

        match state.details.settings.chat_mode {
            ChatMode::Normal => {}
            ChatMode::Emoji => {
                if !is_emoji_only(text) {
                    return Err(RoomError::ChatRestricted("Only emoji are allowed in this room"));
                }
            }
            ChatMode::Slow => {
                let interval = self.context.config.slow_mode_interval;
                state.last_message_at.retain(|_, last| now - *last < interval);

                if state.last_message_at.contains_key(&author.id) {
                    return Err(RoomError::ChatRestricted("Slow mode is enabled, wait a bit"));
                }
            }
        }

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            user_id: author.id,
            user_name: author.name,
            timestamp: now,
        };

        if state.details.settings.chat_mode == ChatMode::Slow {
            state.last_message_at.insert(message.user_id.clone(), now);
        }

        state.messages.push_back(message.clone());

        let limit = self.context.config.message_history_limit;
        while state.messages.len() > limit {
            state.messages.pop_front();
        }

        self.context.emit(CollabEvent::NewMessage {
            room_id: self.id.clone(),
            message: message.clone(),
        });

        Ok(message)
    }

    /// Registers a vote to skip the current track. A majority of users skips it.
    pub fn vote_skip(&self, user_id: &str) -> Result<SkipVote, RoomError> {
        let mut state = self.state.lock();

        if !state.details.settings.vote_to_skip {
            return Err(RoomError::VoteToSkipDisabled);
        }

        state.user(user_id).ok_or(RoomError::UserNotInRoom)?;

        if state.current_track.is_none() {
            return Err(RoomError::NothingPlaying);
        }

        state.skip_votes.insert(user_id.to_string());

        Ok(self.tally_skip_votes(&mut state))
    }

    /// Skips the current track if a majority voted for it, otherwise announces the count.
    fn tally_skip_votes(&self, state: &mut RoomState) -> SkipVote {
        let votes = state.skip_votes.len();
        let required = state.users.len() / 2 + 1;

        if votes >= required {
            info!("Vote passed, skipping track in room {}", state.details.name);

            let next = self.advance_locked(state);

            return SkipVote {
                votes,
                required,
                skipped_to: Some(next),
            };
        }

        self.context.emit(CollabEvent::SkipVoteUpdate {
            room_id: self.id.clone(),
            votes,
            required,
        });

        SkipVote {
            votes,
            required,
            skipped_to: None,
        }
    }

    fn advance_locked(&self, state: &mut RoomState) -> Option<QueuedTrack> {
        state.promote_next();

        if state.details.settings.dj_mode == DjMode::Rotation {
            if let Some(next_dj) = state.rotate_dj() {
                self.emit_dj_changed(state, next_dj);
            }
        }

        self.emit_queue_update(state);
        state.current_track.clone()
    }

    fn emit_queue_update(&self, state: &RoomState) {
        self.context.emit(CollabEvent::QueueUpdated {
            room_id: self.id.clone(),
            queue: state.queue.iter().cloned().collect(),
            current_track: state.current_track.clone(),
        });
    }

    fn emit_dj_changed(&self, state: &RoomState, user: UserData) {
        info!("{} is now the DJ of room {}", user.name, state.details.name);

        self.context.emit(CollabEvent::DjChanged {
            room_id: self.id.clone(),
            user,
        });
    }
}

impl RoomState {
    fn user(&self, user_id: &str) -> Option<&UserData> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Makes the head of the queue the current track. Clears it if the queue is empty.
    fn promote_next(&mut self) {
        self.current_track = self.queue.pop_front();
        self.playback = None;
        self.skip_votes.clear();
    }

    /// Hands the DJ role to the user that joined after the current DJ.
    fn rotate_dj(&mut self) -> Option<UserData> {
        if self.users.len() < 2 {
            return None;
        }

        let current = self.users.iter().position(|u| u.is_dj).unwrap_or(0);
        let next = (current + 1) % self.users.len();

        self.users[current].is_dj = false;
        self.users[next].is_dj = true;

        Some(self.users[next].clone())
    }
}
