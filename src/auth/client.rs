use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{Pin, Resource};

const PLEX_TV_URL: &str = "https://plex.tv/api/v2";
const PLEX_WEB_AUTH_URL: &str = "https://app.plex.tv/auth#?";
const PRODUCT: &str = "plexdash";

/// How often and how long to poll a pin before giving up. 60 attempts at
/// 2 second spacing matches the two-minute pin lifetime on plex.tv.
pub const PIN_POLL_ATTEMPTS: u32 = 60;
pub const PIN_POLL_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("plex.tv returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("pin was not approved in time")]
    Timeout,
    #[error("account has no media servers")]
    NoServers,
}

/// Client for the plex.tv account API (not the media server).
pub struct PlexAuthClient {
    http: Client,
    client_id: String,
}

impl PlexAuthClient {
    /// `client_id` identifies this installation to plex.tv; it must stay
    /// stable across runs or issued tokens get orphaned.
    pub fn new(client_id: &str) -> Result<Self, AuthError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("plexdash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            client_id: client_id.to_string(),
        })
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AuthError::Status {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            })
        }
    }

    /// Create a strong pin for this client.
    pub fn create_pin(&self) -> Result<Pin, AuthError> {
        let response = self
            .http
            .post(format!("{PLEX_TV_URL}/pins?strong=true"))
            .header("Accept", "application/json")
            .header("X-Plex-Client-Identifier", &self.client_id)
            .header("X-Plex-Product", PRODUCT)
            .header("X-Plex-Version", env!("CARGO_PKG_VERSION"))
            .header("X-Plex-Device", "Linux")
            .header("X-Plex-Device-Name", "plexdash head unit")
            .send()?;

        Ok(Self::check_status(response)?.json()?)
    }

    /// The URL the user opens in a browser to approve the pin.
    pub fn auth_url(&self, pin: &Pin) -> String {
        format!(
            "{PLEX_WEB_AUTH_URL}clientID={}&code={}&context%5Bdevice%5D%5Bproduct%5D={PRODUCT}",
            self.client_id, pin.code
        )
    }

    /// Ask plex.tv whether the pin has been approved yet.
    pub fn check_pin(&self, pin_id: i64, code: &str) -> Result<Pin, AuthError> {
        let response = self
            .http
            .get(format!("{PLEX_TV_URL}/pins/{pin_id}?code={code}"))
            .header("Accept", "application/json")
            .header("X-Plex-Client-Identifier", &self.client_id)
            .send()?;

        Ok(Self::check_status(response)?.json()?)
    }

    /// Poll the pin until a token shows up. Transient poll failures are
    /// logged and counted as a regular attempt; after `attempts` without a
    /// token the flow fails with `Timeout`.
    pub fn poll_for_token(
        &self,
        pin_id: i64,
        code: &str,
        attempts: u32,
        delay: Duration,
    ) -> Result<String, AuthError> {
        for attempt in 0..attempts {
            match self.check_pin(pin_id, code) {
                Ok(pin) => {
                    if let Some(token) = pin.auth_token {
                        debug!(attempt, "pin approved");
                        return Ok(token);
                    }
                }
                Err(e) => warn!(attempt, error = %e, "pin poll failed, retrying"),
            }
            thread::sleep(delay);
        }
        Err(AuthError::Timeout)
    }

    /// The account's media servers, with connection candidates.
    pub fn servers(&self, token: &str) -> Result<Vec<Resource>, AuthError> {
        let response = self
            .http
            .get(format!(
                "{PLEX_TV_URL}/resources?includeHttps=1&includeRelay=1"
            ))
            .header("Accept", "application/json")
            .header("X-Plex-Client-Identifier", &self.client_id)
            .header("X-Plex-Token", token)
            .send()?;

        let resources: Vec<Resource> = Self::check_status(response)?.json()?;
        let servers: Vec<Resource> = resources.into_iter().filter(Resource::is_server).collect();
        if servers.is_empty() {
            return Err(AuthError::NoServers);
        }
        Ok(servers)
    }
}
