//! Player-facing small types and handles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Commands accepted by the audio thread. All fire-and-forget: nothing
/// blocks the sender waiting on audio hardware.
#[derive(Debug)]
pub enum PlayerCmd {
    /// Download and start playing the given stream URL.
    Play(String),
    /// Pause the current sink, keeping its position.
    Pause,
    /// Resume a paused sink.
    Resume,
    /// Stop and drop the current sink.
    Stop,
    /// Jump to an absolute position within the current track.
    SeekTo(Duration),
    /// Shut the audio thread down.
    Quit,
}

/// Events emitted by the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The sink ran out of audio while playing. Emitted once per track.
    TrackEnded,
}

/// Runtime playback information shared with the event loop.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Whether playback is currently active.
    pub playing: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
