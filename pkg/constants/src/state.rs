//! Graph store constants.

/// Number of recent store events kept for `events_since` replay.
pub const EVENT_LOG_CAPACITY: usize = 256;

/// Capacity of the broadcast channel feeding live subscribers.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
