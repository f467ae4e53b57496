use chrono::Duration;

/// The configuration of the collab system
#[derive(Debug, Clone)]
pub struct Config {
    /// How many chat messages a room keeps, oldest are dropped first
    pub message_history_limit: usize,
    /// How long an author has to wait between messages in slow chat mode
    pub slow_mode_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            message_history_limit: 100,
            slow_mode_interval: Duration::seconds(5),
        }
    }
}
