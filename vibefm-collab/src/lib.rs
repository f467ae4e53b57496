mod config;
mod data;
mod events;
mod rooms;
mod util;

use std::sync::Arc;

use crossbeam::channel::unbounded;
use dashmap::DashMap;

pub use config::*;
pub use data::*;
pub use events::*;
pub use rooms::*;
pub use util::slugify;

// Reduces verbosity
type ArcedStore<Id, T> = Arc<DashMap<Id, Arc<T>>>;

/// The vibefm collab system, holding every room and the state shared between listeners.
pub struct Collab {
    event_receiver: EventReceiver,

    pub rooms: RoomManager,
}

/// A type passed to various components of the collab system, to access state and emit events.
#[derive(Clone)]
pub struct CollabContext {
    pub config: Config,
    pub rooms: ArcedStore<RoomId, Room>,

    event_sender: EventSender,
}

impl Collab {
    pub fn new(config: Config) -> Self {
        let (event_sender, event_receiver) = unbounded();

        let context = CollabContext {
            config,
            rooms: Default::default(),
            event_sender,
        };

        Self {
            rooms: RoomManager::new(&context),
            event_receiver,
        }
    }

    /// Blocks until the next event is emitted.
    /// Returns [None] if the channel is disconnected.
    pub fn wait_for_event(&self) -> Option<CollabEvent> {
        self.event_receiver.recv().ok()
    }

    /// Returns the next event if one is pending.
    pub fn try_event(&self) -> Option<CollabEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Returns a receiver that can be moved to another thread.
    pub fn events(&self) -> EventReceiver {
        self.event_receiver.clone()
    }
}

impl Default for Collab {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl CollabContext {
    pub fn emit(&self, event: CollabEvent) {
        // The receiving half lives in [Collab], so this only fails during shutdown
        let _ = self.event_sender.send(event);
    }
}
