// Save events
//
// Broadcast so that callers can observe saves that run on the timer task,
// including failures that have no synchronous caller to return to.

use crate::error::SaveError;

/// Buffer size of each proxy's event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// What caused a save to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveTrigger {
    /// The quiet period elapsed
    Automatic,

    /// An explicit `flush()` call
    Flush,

    /// The proxy's target was replaced
    TargetReplaced,

    /// The proxy was torn down
    Teardown,
}

/// Events emitted by an autosave proxy
#[derive(Clone, Debug)]
pub enum SaveEvent {
    /// A tracked write scheduled a save
    Scheduled {
        property: String,
        /// Whether a pending save was replaced (its timer restarted)
        superseded: bool,
    },

    /// A save ran successfully
    Saved { trigger: SaveTrigger },

    /// A save function returned an error
    SaveFailed {
        trigger: SaveTrigger,
        error: SaveError,
    },

    /// A pending save was dropped without running
    Cancelled,

    /// The proxy's target was replaced
    TargetReplaced { has_target: bool },
}
