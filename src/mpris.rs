//! MPRIS session bridge.
//!
//! Publishes current-track metadata, playback status and the enabled
//! transport actions over D-Bus, and forwards incoming transport commands to
//! the runtime as `ControlCmd`s. The three head-unit custom actions live on a
//! separate `dev.plexdash.Dashboard1` interface since MPRIS has no
//! custom-action slot.
//!
//! The bridge itself holds no playback state beyond the shared snapshot the
//! runtime writes into it; it is a translator, not an owner.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{error, warn};
use zbus::object_server::SignalEmitter;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::api::Track;

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.plexdash";

/// Externally visible playback state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The mode-contextual custom actions exposed to the head unit shell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CustomAction {
    PlayAlbumFromCurrent,
    PlayAlbumFromStart,
    BackToShuffle,
}

impl CustomAction {
    pub fn name(self) -> &'static str {
        match self {
            Self::PlayAlbumFromCurrent => "PLAY_ALBUM_FROM_CURRENT",
            Self::PlayAlbumFromStart => "PLAY_ALBUM_FROM_START",
            Self::BackToShuffle => "BACK_TO_SHUFFLE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PlayAlbumFromCurrent => "Play Album from Current",
            Self::PlayAlbumFromStart => "Play Album from Start",
            Self::BackToShuffle => "Back to Shuffle",
        }
    }
}

/// Transport commands flowing from the session into the runtime.
#[derive(Clone, Debug)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Absolute seek within the current track.
    SeekTo(Duration),
    /// Relative seek, offset in microseconds (MPRIS `Seek` semantics).
    SeekBy(i64),
    Custom(CustomAction),
}

/// Snapshot of everything the D-Bus interfaces publish.
#[derive(Debug, Default)]
pub(crate) struct SharedState {
    pub(crate) playback: PlaybackState,
    pub(crate) title: Option<String>,
    pub(crate) artist: Vec<String>,
    pub(crate) album: Option<String>,
    pub(crate) length_micros: Option<i64>,
    pub(crate) art_url: Option<String>,
    pub(crate) track_id: Option<OwnedObjectPath>,
    pub(crate) position_micros: i64,
    pub(crate) can_next: bool,
    pub(crate) can_prev: bool,
    pub(crate) actions: Vec<CustomAction>,
}

/// Runtime-side handle: setters update the shared snapshot and nudge the
/// service thread to emit PropertiesChanged.
pub struct MprisHandle {
    pub(crate) state: Arc<Mutex<SharedState>>,
    pub(crate) notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
        let _ = self.notify.send(());
    }

    /// Publish metadata for the track at the given queue position, or clear
    /// everything when there is no current track.
    pub fn set_track_metadata(
        &self,
        position: Option<usize>,
        track: Option<&Track>,
        art_url: Option<String>,
    ) {
        if let Ok(mut s) = self.state.lock() {
            match track {
                Some(t) => {
                    s.title = Some(t.title.clone());
                    s.artist = vec![
                        t.artist_name
                            .clone()
                            .unwrap_or_else(|| "Unknown Artist".to_string()),
                    ];
                    s.album = Some(
                        t.album_title
                            .clone()
                            .unwrap_or_else(|| "Unknown Album".to_string()),
                    );
                    s.length_micros = Some((t.duration as i64).saturating_mul(1000));
                    s.art_url = art_url;
                    s.track_id = position.and_then(|i| {
                        ObjectPath::try_from(format!("{MPRIS_PATH}/track/{i}"))
                            .ok()
                            .map(Into::into)
                    });
                }
                None => {
                    s.title = None;
                    s.artist = Vec::new();
                    s.album = None;
                    s.length_micros = None;
                    s.art_url = None;
                    s.track_id = None;
                }
            }
        }
        let _ = self.notify.send(());
    }

    /// Publish the enabled transport actions and the mode-contextual custom
    /// actions.
    pub fn set_capabilities(&self, can_next: bool, can_prev: bool, actions: Vec<CustomAction>) {
        if let Ok(mut s) = self.state.lock() {
            s.can_next = can_next;
            s.can_prev = can_prev;
            s.actions = actions;
        }
        let _ = self.notify.send(());
    }

    /// Pass the sink's playback position through. Position changes do not
    /// emit PropertiesChanged; MPRIS clients poll the property.
    pub fn set_position(&self, elapsed: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = elapsed.as_micros().min(i64::MAX as u128) as i64;
        }
    }
}

pub(crate) struct RootIface {
    pub(crate) tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // Headless; nothing to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "plexdash"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

pub(crate) struct PlayerIface {
    pub(crate) tx: Sender<ControlCmd>,
    pub(crate) state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::SeekBy(offset));
    }

    fn set_position(&self, _track_id: ObjectPath<'_>, position: i64) {
        if position < 0 {
            return;
        }
        let _ = self
            .tx
            .send(ControlCmd::SeekTo(Duration::from_micros(position as u64)));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.state.lock().map(|s| s.can_next).unwrap_or(false)
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.state.lock().map(|s| s.can_prev).unwrap_or(false)
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(ref id) = s.track_id {
            if let Ok(path) = ObjectPath::try_from(id.as_str().to_owned()) {
                put("mpris:trackid", Value::from(path));
            }
        }
        if let Some(ref title) = s.title {
            put("xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            put("xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(ref album) = s.album {
            put("xesam:album", Value::from(album.clone()));
        }
        if let Some(length) = s.length_micros {
            put("mpris:length", Value::from(length));
        }
        if let Some(ref art) = s.art_url {
            put("mpris:artUrl", Value::from(art.clone()));
        }

        map
    }
}

pub(crate) struct DashboardIface {
    pub(crate) tx: Sender<ControlCmd>,
    pub(crate) state: Arc<Mutex<SharedState>>,
}

#[interface(name = "dev.plexdash.Dashboard1")]
impl DashboardIface {
    /// Swap queue context to the current track's album, keeping the audio
    /// playing.
    fn play_album_from_current(&self) {
        let _ = self
            .tx
            .send(ControlCmd::Custom(CustomAction::PlayAlbumFromCurrent));
    }

    /// Restart the current track's album from its first track.
    fn play_album_from_start(&self) {
        let _ = self
            .tx
            .send(ControlCmd::Custom(CustomAction::PlayAlbumFromStart));
    }

    /// Re-fetch the library and return to a fresh shuffle.
    fn back_to_shuffle(&self) {
        let _ = self.tx.send(ControlCmd::Custom(CustomAction::BackToShuffle));
    }

    /// Mode-contextual actions as `(name, human label)` pairs, in the order
    /// a shell should display them.
    #[zbus(property)]
    fn available_actions(&self) -> Vec<(String, String)> {
        let Ok(s) = self.state.lock() else {
            return vec![];
        };
        s.actions
            .iter()
            .map(|a| (a.name().to_string(), a.label().to_string()))
            .collect()
    }
}

/// Spawn the D-Bus service thread and return the runtime-side handle.
///
/// Bus failures (no session bus on a bare head unit without D-Bus) are
/// logged and leave the player running without external control.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            if let Err(e) = serve(tx, state_for_thread, notify_rx).await {
                error!(error = %e, "MPRIS service stopped");
            }
        });
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn serve(
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
    notify_rx: Receiver<()>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(BUS_NAME).await?;

    let object_server = connection.object_server();
    object_server
        .at(MPRIS_PATH, RootIface { tx: tx.clone() })
        .await?;
    object_server
        .at(
            MPRIS_PATH,
            PlayerIface {
                tx: tx.clone(),
                state: state.clone(),
            },
        )
        .await?;
    object_server
        .at(MPRIS_PATH, DashboardIface { tx, state })
        .await?;

    let player_ref = object_server
        .interface::<_, PlayerIface>(MPRIS_PATH)
        .await?;
    let dashboard_ref = object_server
        .interface::<_, DashboardIface>(MPRIS_PATH)
        .await?;

    // Coalesce notifications: one PropertiesChanged burst per tick at most.
    loop {
        Timer::after(Duration::from_millis(100)).await;

        let mut dirty = false;
        while notify_rx.try_recv().is_ok() {
            dirty = true;
        }
        if !dirty {
            continue;
        }

        let result: zbus::Result<()> = async {
            let emitter: &SignalEmitter<'_> = player_ref.signal_emitter();
            let player = player_ref.get().await;
            player.playback_status_changed(emitter).await?;
            player.metadata_changed(emitter).await?;
            player.can_go_next_changed(emitter).await?;
            player.can_go_previous_changed(emitter).await?;

            let dashboard = dashboard_ref.get().await;
            dashboard
                .available_actions_changed(dashboard_ref.signal_emitter())
                .await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            warn!(error = %e, "failed to emit PropertiesChanged");
        }
    }
}

#[cfg(test)]
mod tests;
