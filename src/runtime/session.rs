//! Queue-to-session synchronization and track handoff to the sink.

use tracing::warn;

use crate::api::{PlexClient, Track};
use crate::mpris::{CustomAction, MprisHandle, PlaybackState};
use crate::player::{Player, PlayerCmd};
use crate::queue::{Mode, QueueManager};

/// Push the full queue view to the session: current-track metadata,
/// playback status, transport capabilities and the contextual actions.
pub(super) fn update_mpris(
    mpris: &MprisHandle,
    client: &PlexClient,
    queue: &QueueManager,
    playback: PlaybackState,
) {
    mpris.set_playback(playback);

    let current = queue.current();
    let art_url = current.and_then(|t| {
        client.image_url(t.thumb.as_deref().or(t.album_thumb.as_deref()))
    });
    mpris.set_track_metadata(Some(queue.position()), current, art_url);

    mpris.set_capabilities(
        queue.has_next(),
        queue.has_previous(),
        actions_for(queue.mode()),
    );
}

/// The custom actions a shell should offer in the given mode.
pub(super) fn actions_for(mode: &Mode) -> Vec<CustomAction> {
    match mode {
        Mode::Shuffle => vec![
            CustomAction::PlayAlbumFromCurrent,
            CustomAction::PlayAlbumFromStart,
        ],
        Mode::Album(_) => vec![CustomAction::BackToShuffle],
    }
}

/// Hand a track to the sink. Returns false when the track has no playable
/// part; the caller decides whether to try the next one.
pub(super) fn play_track(client: &PlexClient, player: &Player, track: &Track) -> bool {
    match track.stream_key() {
        Some(key) => {
            let _ = player.send(PlayerCmd::Play(client.track_url(key)));
            true
        }
        None => {
            warn!(title = %track.title, id = %track.rating_key, "track has no media part, skipping");
            false
        }
    }
}

/// Play the track under the cursor, skipping forward past unplayable
/// entries. Returns true when something was handed to the sink.
pub(super) fn play_current(client: &PlexClient, player: &Player, queue: &mut QueueManager) -> bool {
    loop {
        let Some(track) = queue.current() else {
            return false;
        };
        if play_track(client, player, track) {
            return true;
        }
        if queue.advance().is_none() {
            return false;
        }
    }
}
