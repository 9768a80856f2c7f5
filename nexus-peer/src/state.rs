//! Shared peer state
//!
//! State read by the HTTP layer while the engine task owns the session.
//! Only lock-free counters and the event bus live here; session contents are
//! reached through engine snapshots.

use nexus_common::events::{EventBus, NexusEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Shared state accessible by all components
#[derive(Debug)]
pub struct SharedState {
    /// Event bus for SSE and local observers
    pub events: EventBus,

    /// Session ticks executed since startup
    pub ticks_total: AtomicU64,

    /// Commands dropped because the engine's inbox was full or closed
    pub commands_dropped_total: AtomicU64,
}

impl SharedState {
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            ticks_total: AtomicU64::new(0),
            commands_dropped_total: AtomicU64::new(0),
        }
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<NexusEvent> {
        self.events.subscribe()
    }

    pub fn record_tick(&self) {
        self.ticks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks_total.load(Ordering::Relaxed)
    }

    pub fn record_dropped_command(&self) {
        self.commands_dropped_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_commands(&self) -> u64 {
        self.commands_dropped_total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let state = SharedState::new(EventBus::new(8));
        assert_eq!(state.ticks(), 0);
        state.record_tick();
        state.record_tick();
        state.record_dropped_command();
        assert_eq!(state.ticks(), 2);
        assert_eq!(state.dropped_commands(), 1);
    }
}
