//! Playback sink: a dedicated audio thread driven by a command channel.
//!
//! The thread downloads a stream URL, decodes it with rodio and plays it.
//! It reports elapsed time through a shared handle and emits a single
//! `TrackEnded` event when the sink runs dry — the only source of automatic
//! queue advancement.

mod sink;
mod thread;
mod types;

pub use types::*;

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use self::thread::spawn_player_thread;

pub struct Player {
    tx: Sender<PlayerCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Spawn the audio thread. `events_tx` receives sink events (track
    /// ended); the runtime merges them with external commands.
    pub fn new(events_tx: Sender<PlayerEvent>) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let join = spawn_player_thread(rx, events_tx, playback.clone());

        Self {
            tx,
            playback,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), mpsc::SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn quit(&self) {
        let _ = self.send(PlayerCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

#[cfg(test)]
mod tests;
