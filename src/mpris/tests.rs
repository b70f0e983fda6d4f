use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::api::Track;

fn track() -> Track {
    serde_json::from_value(json!({
        "ratingKey": "501",
        "key": "/library/metadata/501",
        "parentRatingKey": "500",
        "grandparentRatingKey": "499",
        "title": "Windowpane",
        "parentTitle": "Damnation",
        "grandparentTitle": "Opeth",
        "duration": 224000,
        "index": 1
    }))
    .unwrap()
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify, _rx) = mpsc::channel();
    (
        MprisHandle {
            state: state.clone(),
            notify,
        },
        state,
    )
}

#[test]
fn playback_status_strings_follow_the_mpris_spec() {
    let (tx, _rx) = mpsc::channel();
    let state = Arc::new(Mutex::new(SharedState::default()));
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert_eq!(iface.playback_status(), "Stopped");

    state.lock().unwrap().playback = PlaybackState::Playing;
    assert_eq!(iface.playback_status(), "Playing");

    state.lock().unwrap().playback = PlaybackState::Paused;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn transport_methods_forward_control_commands() {
    let (tx, rx) = mpsc::channel();
    let state = Arc::new(Mutex::new(SharedState::default()));
    let iface = PlayerIface { tx, state };

    iface.next();
    iface.previous();
    iface.play_pause();
    iface.stop();
    iface.seek(-5_000_000);

    assert!(matches!(rx.try_recv(), Ok(ControlCmd::Next)));
    assert!(matches!(rx.try_recv(), Ok(ControlCmd::Prev)));
    assert!(matches!(rx.try_recv(), Ok(ControlCmd::PlayPause)));
    assert!(matches!(rx.try_recv(), Ok(ControlCmd::Stop)));
    assert!(matches!(rx.try_recv(), Ok(ControlCmd::SeekBy(-5_000_000))));
    assert!(rx.try_recv().is_err());
}

#[test]
fn set_position_rejects_negative_offsets() {
    let (tx, rx) = mpsc::channel();
    let state = Arc::new(Mutex::new(SharedState::default()));
    let iface = PlayerIface { tx, state };

    let id = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/0").unwrap();
    iface.set_position(id.clone(), -1);
    assert!(rx.try_recv().is_err());

    iface.set_position(id, 30_000_000);
    match rx.try_recv() {
        Ok(ControlCmd::SeekTo(pos)) => assert_eq!(pos, Duration::from_secs(30)),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn set_track_metadata_fills_shared_state() {
    let (handle, state) = handle();
    handle.set_track_metadata(Some(3), Some(&track()), Some("http://pms/thumb".into()));

    let s = state.lock().unwrap();
    assert_eq!(s.title.as_deref(), Some("Windowpane"));
    assert_eq!(s.artist, vec!["Opeth".to_string()]);
    assert_eq!(s.album.as_deref(), Some("Damnation"));
    // Plex reports milliseconds, MPRIS wants microseconds.
    assert_eq!(s.length_micros, Some(224_000_000));
    assert_eq!(s.art_url.as_deref(), Some("http://pms/thumb"));
    assert_eq!(
        s.track_id.as_ref().map(|p| p.as_str()),
        Some("/org/mpris/MediaPlayer2/track/3")
    );
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state) = handle();
    handle.set_track_metadata(Some(3), Some(&track()), Some("http://pms/thumb".into()));

    let (tx, _rx) = mpsc::channel();
    let iface = PlayerIface { tx, state };
    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "mpris:length",
        "mpris:artUrl",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn clearing_metadata_empties_the_map() {
    let (handle, state) = handle();
    handle.set_track_metadata(Some(0), Some(&track()), None);
    handle.set_track_metadata(None, None, None);

    let (tx, _rx) = mpsc::channel();
    let iface = PlayerIface { tx, state };
    assert!(iface.metadata().is_empty());
}

#[test]
fn capabilities_drive_can_go_properties() {
    let (handle, state) = handle();
    let (tx, _rx) = mpsc::channel();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    assert!(!iface.can_go_next());
    assert!(!iface.can_go_previous());

    handle.set_capabilities(true, false, vec![]);
    assert!(iface.can_go_next());
    assert!(!iface.can_go_previous());
}

#[test]
fn available_actions_expose_name_and_label_pairs() {
    let (handle, state) = handle();
    handle.set_capabilities(
        true,
        true,
        vec![
            CustomAction::PlayAlbumFromCurrent,
            CustomAction::PlayAlbumFromStart,
        ],
    );

    let (tx, _rx) = mpsc::channel();
    let iface = DashboardIface { tx, state };
    assert_eq!(
        iface.available_actions(),
        vec![
            (
                "PLAY_ALBUM_FROM_CURRENT".to_string(),
                "Play Album from Current".to_string()
            ),
            (
                "PLAY_ALBUM_FROM_START".to_string(),
                "Play Album from Start".to_string()
            ),
        ]
    );
}

#[test]
fn dashboard_methods_send_custom_actions() {
    let (tx, rx) = mpsc::channel();
    let state = Arc::new(Mutex::new(SharedState::default()));
    let iface = DashboardIface { tx, state };

    iface.back_to_shuffle();
    assert!(matches!(
        rx.try_recv(),
        Ok(ControlCmd::Custom(CustomAction::BackToShuffle))
    ));
}

#[test]
fn position_setter_saturates_into_micros() {
    let (handle, state) = handle();
    handle.set_position(Duration::from_secs(90));

    let (tx, _rx) = mpsc::channel();
    let iface = PlayerIface { tx, state };
    assert_eq!(iface.position(), 90_000_000);
}
