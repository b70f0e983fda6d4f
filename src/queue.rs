//! Playback queue: exposes the two-mode playlist model used by the runtime.
//!
//! The `QueueManager` model lives in `queue::model` and owns the shuffled
//! library, the album playlist and the cursor.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
