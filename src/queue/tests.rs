use super::*;
use crate::api::Track;

fn track(id: &str, album: &str, number: u32) -> Track {
    Track {
        rating_key: id.to_string(),
        key: format!("/library/metadata/{id}"),
        parent_rating_key: album.to_string(),
        grandparent_rating_key: "artist-1".to_string(),
        title: format!("Track {id}"),
        album_title: Some("Album".to_string()),
        artist_name: Some("Artist".to_string()),
        duration: 180_000,
        track_number: number,
        thumb: None,
        album_thumb: None,
        media: Vec::new(),
    }
}

fn library() -> Vec<Track> {
    vec![
        track("a", "al-1", 1),
        track("b", "al-1", 2),
        track("c", "al-2", 1),
        track("d", "al-2", 2),
    ]
}

fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.rating_key.as_str()).collect()
}

#[test]
fn shuffle_mode_is_a_permutation_with_cursor_zero() {
    let mut q = QueueManager::new();
    q.enter_shuffle_mode(library());

    assert_eq!(q.mode(), &Mode::Shuffle);
    assert_eq!(q.len(), 4);
    assert_eq!(q.position(), 0);

    let mut got = ids(q.tracks());
    got.sort_unstable();
    assert_eq!(got, vec!["a", "b", "c", "d"]);
    assert_eq!(q.current().unwrap().rating_key, q.tracks()[0].rating_key);
}

#[test]
fn shuffle_mode_with_empty_library_yields_empty_queue() {
    let mut q = QueueManager::new();
    q.enter_shuffle_mode(Vec::new());

    assert!(q.is_empty());
    assert!(q.current().is_none());
    assert!(q.advance().is_none());
    assert!(q.retreat().is_none());
    assert!(!q.has_next());
    assert!(!q.has_previous());
}

#[test]
fn album_mode_sorts_by_track_number_and_seeds_cursor() {
    // Unsorted input: track numbers 3, 1, 2; seed is the tn=2 item.
    let tracks = vec![
        track("x3", "al-9", 3),
        track("x1", "al-9", 1),
        track("x2", "al-9", 2),
    ];
    let seed = tracks[2].clone();

    let mut q = QueueManager::new();
    q.enter_album_mode(tracks, "al-9".to_string(), Some(&seed));

    assert_eq!(q.mode(), &Mode::Album("al-9".to_string()));
    assert_eq!(ids(q.tracks()), vec!["x1", "x2", "x3"]);
    assert_eq!(q.position(), 1);
    assert_eq!(q.current().unwrap().rating_key, "x2");
}

#[test]
fn album_mode_without_seed_starts_at_zero() {
    let tracks = vec![track("x2", "al-9", 2), track("x1", "al-9", 1)];
    let mut q = QueueManager::new();
    q.enter_album_mode(tracks, "al-9".to_string(), None);

    assert_eq!(q.position(), 0);
    assert_eq!(q.current().unwrap().rating_key, "x1");
}

#[test]
fn album_mode_with_unknown_seed_falls_back_to_zero() {
    let tracks = vec![track("x1", "al-9", 1), track("x2", "al-9", 2)];
    let stranger = track("zz", "al-7", 5);

    let mut q = QueueManager::new();
    q.enter_album_mode(tracks, "al-9".to_string(), Some(&stranger));

    assert_eq!(q.position(), 0);
}

#[test]
fn advance_walks_to_the_end_then_stops() {
    let mut q = QueueManager::new();
    q.enter_shuffle_mode(library());

    assert_eq!(q.position(), 0);
    assert!(q.advance().is_some());
    assert_eq!(q.position(), 1);
    assert!(q.advance().is_some());
    assert_eq!(q.position(), 2);
    assert!(q.advance().is_some());
    assert_eq!(q.position(), 3);

    // End of queue: no wraparound, cursor unchanged.
    assert!(q.advance().is_none());
    assert_eq!(q.position(), 3);
    assert!(q.current().is_some());
}

#[test]
fn retreat_at_start_returns_none_and_keeps_cursor() {
    let mut q = QueueManager::new();
    q.enter_shuffle_mode(library());

    assert!(q.retreat().is_none());
    assert_eq!(q.position(), 0);

    q.advance();
    q.advance();
    let retreated = q.retreat().unwrap().rating_key.clone();
    assert_eq!(retreated, q.tracks()[1].rating_key);
    assert_eq!(q.position(), 1);
}

#[test]
fn has_next_and_has_previous_track_the_cursor() {
    let mut q = QueueManager::new();
    q.enter_shuffle_mode(library());

    assert!(q.has_next());
    assert!(!q.has_previous());

    q.advance();
    assert!(q.has_next());
    assert!(q.has_previous());

    q.advance();
    q.advance();
    assert!(!q.has_next());
    assert!(q.has_previous());
}

#[test]
fn back_to_shuffle_rebuilds_from_the_new_library_list() {
    let mut q = QueueManager::new();
    q.enter_shuffle_mode(library());

    let album = vec![
        track("x1", "al-9", 1),
        track("x2", "al-9", 2),
        track("x3", "al-9", 3),
    ];
    q.enter_album_mode(album, "al-9".to_string(), None);
    q.advance();
    q.advance();
    assert_eq!(q.position(), 2);

    // Freshly fetched library, disjoint from the album list.
    let fresh = vec![track("n1", "al-5", 1), track("n2", "al-5", 2)];
    q.enter_shuffle_mode(fresh);

    assert_eq!(q.mode(), &Mode::Shuffle);
    assert_eq!(q.position(), 0);
    assert_eq!(q.len(), 2);
    let mut got = ids(q.tracks());
    got.sort_unstable();
    assert_eq!(got, vec!["n1", "n2"]);
}
