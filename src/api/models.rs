//! Deserialized shapes of the Plex Media Server JSON responses.
//!
//! Field names follow the wire format (`ratingKey`, `parentRatingKey`, ...)
//! via serde renames; the Rust side uses descriptive names since "parent"
//! means album and "grandparent" means artist for track metadata.

use serde::Deserialize;

/// A single track as returned by the `/library/...` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    /// Unique id of the track.
    #[serde(rename = "ratingKey")]
    pub rating_key: String,
    pub key: String,
    /// Album id.
    #[serde(rename = "parentRatingKey")]
    pub parent_rating_key: String,
    /// Artist id.
    #[serde(rename = "grandparentRatingKey")]
    pub grandparent_rating_key: String,
    pub title: String,
    #[serde(rename = "parentTitle")]
    pub album_title: Option<String>,
    #[serde(rename = "grandparentTitle")]
    pub artist_name: Option<String>,
    /// Duration in milliseconds. Plex omits it for a handful of broken files.
    #[serde(default)]
    pub duration: u64,
    /// 1-based position within the album.
    #[serde(rename = "index", default)]
    pub track_number: u32,
    pub thumb: Option<String>,
    #[serde(rename = "parentThumb")]
    pub album_thumb: Option<String>,
    #[serde(rename = "Media", default)]
    pub media: Vec<Media>,
}

impl Track {
    /// The raw server path of the first playable part, if any.
    ///
    /// Tracks without a media part cannot be streamed and are skipped.
    pub fn stream_key(&self) -> Option<&str> {
        self.media
            .first()
            .and_then(|m| m.parts.first())
            .map(|p| p.key.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    #[serde(rename = "Part", default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Part {
    pub key: String,
}

/// A library section (`/library/sections`). Music libraries have
/// `section_type == "artist"`.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub key: String,
    #[serde(rename = "type")]
    pub section_type: String,
    pub title: String,
}

/// Outer envelope of every PMS response.
#[derive(Debug, Deserialize)]
pub struct Container<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: MediaContainer<T>,
}

#[derive(Debug, Deserialize)]
pub struct MediaContainer<T> {
    #[serde(default)]
    pub size: u64,
    /// Item listings (tracks, albums).
    #[serde(rename = "Metadata", default = "Vec::new")]
    pub metadata: Vec<T>,
    /// Directory listings (sections).
    #[serde(rename = "Directory", default = "Vec::new")]
    pub directory: Vec<T>,
}
