use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::api::PlexClient;
use crate::mpris::{ControlCmd, CustomAction, MprisHandle, PlaybackState};
use crate::player::{Player, PlayerCmd, PlayerEvent};
use crate::queue::QueueManager;
use crate::runtime::fetch::{FetchRequest, FetchResult};
use crate::runtime::session::{play_current, update_mpris};

const TICK: Duration = Duration::from_millis(50);

/// State owned by the event loop across iterations. The queue lives here and
/// only here; every mutation happens on this thread.
pub struct EventLoopState {
    pub queue: QueueManager,
    pub playback: PlaybackState,
    /// Last playback state pushed to MPRIS, to skip redundant bursts.
    last_published: PlaybackState,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            queue: QueueManager::new(),
            playback: PlaybackState::Stopped,
            last_published: PlaybackState::Stopped,
        }
    }
}

/// Main loop: merges session commands, sink events and completed fetches,
/// all against the single queue. Returns when Quit arrives.
pub fn run(
    client: &PlexClient,
    player: &Player,
    mpris: &MprisHandle,
    control_rx: &Receiver<ControlCmd>,
    events_rx: &Receiver<PlayerEvent>,
    fetch_tx: &Sender<FetchRequest>,
    fetch_rx: &Receiver<FetchResult>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(result) = fetch_rx.try_recv() {
            apply_fetch_result(result, client, player, mpris, state);
        }

        while let Ok(event) = events_rx.try_recv() {
            match event {
                // End of track is just a skip-next the user did not press.
                PlayerEvent::TrackEnded => skip_next(client, player, mpris, state, true),
            }
        }

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, client, player, mpris, fetch_tx, state) {
                info!("shutting down");
                return Ok(());
            }
        }

        // Mirror the sink's elapsed time into the Position property.
        if let Ok(playback) = player.playback_handle().lock() {
            mpris.set_position(playback.elapsed);
        }

        if state.playback != state.last_published {
            mpris.set_playback(state.playback);
            state.last_published = state.playback;
        }

        thread::sleep(TICK);
    }
}

fn apply_fetch_result(
    result: FetchResult,
    client: &PlexClient,
    player: &Player,
    mpris: &MprisHandle,
    state: &mut EventLoopState,
) {
    match result.request {
        FetchRequest::ShuffleAll { autoplay } => {
            state.queue.enter_shuffle_mode(result.tracks);
            debug!(len = state.queue.len(), "entered shuffle mode");
            if autoplay && play_current(client, player, &mut state.queue) {
                state.playback = PlaybackState::Playing;
            }
        }
        FetchRequest::AlbumFromCurrent { album_id, seed } => {
            // Context swap only: the sink keeps playing the same audio.
            state
                .queue
                .enter_album_mode(result.tracks, album_id, Some(&seed));
            debug!(len = state.queue.len(), "entered album mode from current");
        }
        FetchRequest::AlbumFromStart { album_id } => {
            state.queue.enter_album_mode(result.tracks, album_id, None);
            debug!(len = state.queue.len(), "entered album mode from start");
            if play_current(client, player, &mut state.queue) {
                state.playback = PlaybackState::Playing;
            }
        }
    }
    update_mpris(mpris, client, &state.queue, state.playback);
}

/// Outcome of a skip-next against the queue.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Advance {
    /// Cursor moved; play the new current track.
    Play,
    /// End of queue and the sink drained: publish stopped.
    Stop,
    /// End of queue on a manual skip: leave playback untouched.
    Hold,
}

/// Decide what a skip-next does. `ended` is true only when the sink itself
/// reported the track finishing; a manual Next at the end of the queue must
/// not disturb a playing or paused sink.
pub(super) fn advance_decision(queue: &mut QueueManager, ended: bool) -> Advance {
    if queue.advance().is_some() {
        Advance::Play
    } else if ended {
        Advance::Stop
    } else {
        Advance::Hold
    }
}

fn skip_next(
    client: &PlexClient,
    player: &Player,
    mpris: &MprisHandle,
    state: &mut EventLoopState,
    ended: bool,
) {
    match advance_decision(&mut state.queue, ended) {
        Advance::Play => {
            if play_current(client, player, &mut state.queue) {
                state.playback = PlaybackState::Playing;
            }
            update_mpris(mpris, client, &state.queue, state.playback);
        }
        Advance::Stop => {
            state.playback = PlaybackState::Stopped;
            update_mpris(mpris, client, &state.queue, state.playback);
        }
        Advance::Hold => {}
    }
}

fn skip_previous(
    client: &PlexClient,
    player: &Player,
    mpris: &MprisHandle,
    state: &mut EventLoopState,
) {
    if state.queue.retreat().is_some() {
        if play_current(client, player, &mut state.queue) {
            state.playback = PlaybackState::Playing;
        }
        update_mpris(mpris, client, &state.queue, state.playback);
    }
}

/// Absolute seek target for a relative MPRIS Seek offset, clamped at zero.
pub(super) fn seek_target(elapsed: Duration, offset_micros: i64) -> Duration {
    if offset_micros >= 0 {
        elapsed.saturating_add(Duration::from_micros(offset_micros as u64))
    } else {
        elapsed.saturating_sub(Duration::from_micros(offset_micros.unsigned_abs()))
    }
}

fn handle_control_cmd(
    cmd: ControlCmd,
    client: &PlexClient,
    player: &Player,
    mpris: &MprisHandle,
    fetch_tx: &Sender<FetchRequest>,
    state: &mut EventLoopState,
) -> bool {
    match cmd {
        ControlCmd::Quit => return true,

        ControlCmd::Play => match state.playback {
            PlaybackState::Paused => {
                let _ = player.send(PlayerCmd::Resume);
                state.playback = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {
                if play_current(client, player, &mut state.queue) {
                    state.playback = PlaybackState::Playing;
                    update_mpris(mpris, client, &state.queue, state.playback);
                }
            }
            PlaybackState::Playing => {}
        },

        ControlCmd::Pause => {
            if state.playback == PlaybackState::Playing {
                let _ = player.send(PlayerCmd::Pause);
                state.playback = PlaybackState::Paused;
            }
        }

        ControlCmd::PlayPause => match state.playback {
            PlaybackState::Playing => {
                let _ = player.send(PlayerCmd::Pause);
                state.playback = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                let _ = player.send(PlayerCmd::Resume);
                state.playback = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {
                if play_current(client, player, &mut state.queue) {
                    state.playback = PlaybackState::Playing;
                    update_mpris(mpris, client, &state.queue, state.playback);
                }
            }
        },

        // Stop halts audio; the service and its queue stay up.
        ControlCmd::Stop => {
            let _ = player.send(PlayerCmd::Stop);
            state.playback = PlaybackState::Stopped;
        }

        ControlCmd::Next => skip_next(client, player, mpris, state, false),
        ControlCmd::Prev => skip_previous(client, player, mpris, state),

        ControlCmd::SeekTo(pos) => {
            let _ = player.send(PlayerCmd::SeekTo(pos));
        }

        ControlCmd::SeekBy(offset) => {
            let elapsed = player
                .playback_handle()
                .lock()
                .map(|p| p.elapsed)
                .unwrap_or_default();
            let _ = player.send(PlayerCmd::SeekTo(seek_target(elapsed, offset)));
        }

        ControlCmd::Custom(action) => dispatch_custom(action, fetch_tx, state),
    }

    false
}

/// Custom actions are fetch requests in disguise; the queue only changes
/// when the fetch comes back.
fn dispatch_custom(action: CustomAction, fetch_tx: &Sender<FetchRequest>, state: &EventLoopState) {
    match action {
        CustomAction::PlayAlbumFromCurrent => {
            if let Some(track) = state.queue.current() {
                let _ = fetch_tx.send(FetchRequest::AlbumFromCurrent {
                    album_id: track.parent_rating_key.clone(),
                    seed: track.clone(),
                });
            }
        }
        CustomAction::PlayAlbumFromStart => {
            if let Some(track) = state.queue.current() {
                let _ = fetch_tx.send(FetchRequest::AlbumFromStart {
                    album_id: track.parent_rating_key.clone(),
                });
            }
        }
        CustomAction::BackToShuffle => {
            let _ = fetch_tx.send(FetchRequest::ShuffleAll { autoplay: true });
        }
    }
}
