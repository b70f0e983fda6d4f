//! The two-mode playlist state machine.
//!
//! Two lists coexist — a library-wide shuffle and an album-ordered playlist —
//! but only one is active at a time, selected by `Mode`. Mode switches
//! replace the active list wholesale; they never merge. The cursor is the
//! only field navigation mutates.

use rand::rng;
use rand::seq::SliceRandom;

use crate::api::Track;

/// Which playlist is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Shuffle,
    /// Album context, carrying the album's rating key.
    Album(String),
}

/// Owns the playback lists and the cursor. Created once per service
/// lifetime; lists are rebuilt (not mutated) on every mode switch.
pub struct QueueManager {
    mode: Mode,
    shuffled_library: Vec<Track>,
    album_playlist: Vec<Track>,
    cursor: usize,
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueManager {
    pub fn new() -> Self {
        Self {
            mode: Mode::Shuffle,
            shuffled_library: Vec::new(),
            album_playlist: Vec::new(),
            cursor: 0,
        }
    }

    /// Replace state with a freshly randomized permutation of `tracks`,
    /// cursor at 0. The shuffle happens once, here; excursions into album
    /// mode and back do not reshuffle unless the caller re-enters with a new
    /// track list.
    pub fn enter_shuffle_mode(&mut self, tracks: Vec<Track>) {
        let mut shuffled = tracks;
        shuffled.shuffle(&mut rng());
        self.mode = Mode::Shuffle;
        self.shuffled_library = shuffled;
        self.cursor = 0;
    }

    /// Replace state with the album's tracks sorted by track number. The
    /// cursor lands on `seed` (matched by rating key) when given and found,
    /// otherwise at 0 — a missing seed is coerced, not an error.
    pub fn enter_album_mode(&mut self, tracks: Vec<Track>, album_id: String, seed: Option<&Track>) {
        let mut playlist = tracks;
        playlist.sort_by_key(|t| t.track_number);

        self.cursor = seed
            .and_then(|s| playlist.iter().position(|t| t.rating_key == s.rating_key))
            .unwrap_or(0);
        self.mode = Mode::Album(album_id);
        self.album_playlist = playlist;
    }

    fn active(&self) -> &[Track] {
        match self.mode {
            Mode::Shuffle => &self.shuffled_library,
            Mode::Album(_) => &self.album_playlist,
        }
    }

    /// The track under the cursor, if any.
    pub fn current(&self) -> Option<&Track> {
        self.active().get(self.cursor)
    }

    /// Move to the next track and return it. At end of queue the cursor is
    /// left in place and `None` signals the caller to stop — it is not an
    /// error.
    pub fn advance(&mut self) -> Option<&Track> {
        if self.cursor + 1 < self.active().len() {
            self.cursor += 1;
            self.current()
        } else {
            None
        }
    }

    /// Move to the previous track and return it; `None` at the start.
    pub fn retreat(&mut self) -> Option<&Track> {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.current()
        } else {
            None
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.active().len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Read-only view of the active queue.
    pub fn tracks(&self) -> &[Track] {
        self.active()
    }

    pub fn len(&self) -> usize {
        self.active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }
}
