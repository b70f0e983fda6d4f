//! Library fetch worker.
//!
//! Queue rebuilds go through one worker thread so a slow server never stalls
//! the event loop. The request channel is a single slot in effect: before
//! running anything the worker drains the channel and keeps only the newest
//! request, so rapid mode flips collapse to the last one asked for.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::api::{FetchError, PlexClient, Track};

/// A queue rebuild request. Carries everything the worker needs; the worker
/// never reads event-loop state.
#[derive(Debug, Clone)]
pub enum FetchRequest {
    /// Fetch the whole music section for a fresh shuffle.
    ShuffleAll { autoplay: bool },
    /// Fetch one album, cursor to land on `seed`.
    AlbumFromCurrent { album_id: String, seed: Track },
    /// Fetch one album, to play from its first track.
    AlbumFromStart { album_id: String },
}

/// A successful fetch, paired with the request that produced it so the event
/// loop knows how to apply the tracks.
pub struct FetchResult {
    pub request: FetchRequest,
    pub tracks: Vec<Track>,
}

pub fn spawn_fetch_worker(
    client: PlexClient,
    configured_section: String,
    rx: Receiver<FetchRequest>,
    results_tx: Sender<FetchResult>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // Discovered section id, cached after the first lookup.
        let mut section: Option<String> = if configured_section.is_empty() {
            None
        } else {
            Some(configured_section)
        };

        while let Ok(first) = rx.recv() {
            let request = drain_latest(&rx, first);
            debug!(?request, "running fetch");

            match run_request(&client, &mut section, &request) {
                Ok(tracks) => {
                    info!(count = tracks.len(), "fetch complete");
                    if results_tx.send(FetchResult { request, tracks }).is_err() {
                        break;
                    }
                }
                // The queue keeps its prior state on any failure; the event
                // loop is not told, there is nothing for it to do.
                Err(FetchError::Empty) => warn!(?request, "fetch returned no tracks, keeping queue"),
                Err(e) => warn!(?request, error = %e, "fetch failed, keeping queue"),
            }
        }
    })
}

/// Drop everything queued behind `first` and return the newest request.
pub(super) fn drain_latest(rx: &Receiver<FetchRequest>, first: FetchRequest) -> FetchRequest {
    let mut latest = first;
    while let Ok(next) = rx.try_recv() {
        debug!(superseded = ?latest, "dropping stale fetch request");
        latest = next;
    }
    latest
}

fn run_request(
    client: &PlexClient,
    section: &mut Option<String>,
    request: &FetchRequest,
) -> Result<Vec<Track>, FetchError> {
    let tracks = match request {
        FetchRequest::ShuffleAll { .. } => {
            let id = resolve_section(client, section)?;
            client.all_tracks(&id)?
        }
        FetchRequest::AlbumFromCurrent { album_id, .. } => client.album_tracks(album_id)?,
        FetchRequest::AlbumFromStart { album_id } => client.album_tracks(album_id)?,
    };

    if tracks.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(tracks)
}

fn resolve_section(client: &PlexClient, section: &mut Option<String>) -> Result<String, FetchError> {
    if let Some(id) = section {
        return Ok(id.clone());
    }
    let found = client.find_music_section()?.ok_or(FetchError::Empty)?;
    info!(section = %found.title, key = %found.key, "discovered music section");
    *section = Some(found.key.clone());
    Ok(found.key)
}
