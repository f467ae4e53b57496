use std::sync::Arc;

use vibefm_collab::{Collab, Config};

use crate::hub::{spawn_dispatcher, EventHub};

#[derive(Clone)]
pub struct ServerContext {
    pub collab: Arc<Collab>,
    pub hub: Arc<EventHub>,
}

impl ServerContext {
    /// Creates the collab system and starts forwarding its events to the hub
    pub fn new(config: Config) -> Self {
        let collab = Arc::new(Collab::new(config));
        let hub = EventHub::new();

        spawn_dispatcher(&hub, collab.events());

        Self { collab, hub }
    }
}
