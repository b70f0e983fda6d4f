use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use super::models::{Container, Section, Track};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the track source. A `Transient` or `Status` failure aborts the
/// operation that triggered the fetch; the caller keeps its prior state.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transient(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("fetch succeeded but returned no tracks")]
    Empty,
}

/// Blocking client for one Plex Media Server.
///
/// Cheap to clone; the fetch worker keeps its own copy.
#[derive(Clone)]
pub struct PlexClient {
    http: Client,
    base_url: String,
    token: String,
}

impl PlexClient {
    pub fn new(server_url: &str, token: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("plexdash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: server_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(url = %url, "plex api request");
        let response = self
            .http
            .get(url)
            .header("X-Plex-Token", &self.token)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json()?)
    }

    /// All library sections of the server.
    pub fn library_sections(&self) -> Result<Vec<Section>, FetchError> {
        let url = format!("{}/library/sections", self.base_url);
        let container: Container<Section> = self.get_json(&url)?;
        Ok(container.media_container.directory)
    }

    /// The first music section, if the server has one.
    pub fn find_music_section(&self) -> Result<Option<Section>, FetchError> {
        let sections = self.library_sections()?;
        Ok(sections.into_iter().find(|s| s.section_type == "artist"))
    }

    /// Every track of a library section. `type=10` filters to tracks.
    pub fn all_tracks(&self, section_id: &str) -> Result<Vec<Track>, FetchError> {
        let url = format!(
            "{}/library/sections/{}/all?type=10",
            self.base_url, section_id
        );
        let container: Container<Track> = self.get_json(&url)?;
        Ok(container.media_container.metadata)
    }

    /// The tracks of one album, in server order (not guaranteed sorted).
    pub fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>, FetchError> {
        let url = format!("{}/library/metadata/{}/children", self.base_url, album_id);
        let container: Container<Track> = self.get_json(&url)?;
        Ok(container.media_container.metadata)
    }

    /// Resolve the stream URL for a raw part key. Pure string derivation.
    pub fn track_url(&self, key: &str) -> String {
        format!("{}{}?X-Plex-Token={}", self.base_url, key, self.token)
    }

    /// Resolve an artwork URL from an optional thumb path.
    pub fn image_url(&self, thumb: Option<&str>) -> Option<String> {
        thumb.map(|t| format!("{}{}?X-Plex-Token={}", self.base_url, t, self.token))
    }
}
