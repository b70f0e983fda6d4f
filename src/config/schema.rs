use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/plexdash/config.toml` or
/// `~/.config/plexdash/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `PLEXDASH__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub account: AccountSettings,
    pub playback: PlaybackSettings,
    pub log: LogSettings,
}

/// Missing credentials or server selection. Fatal to the playback service:
/// checked before any queue is built.
#[derive(Debug, Error)]
#[error("no server configured (missing URL or token) — run `plexdash login` first")]
pub struct NotConfiguredError;

impl Settings {
    /// The token used against the media server: the server-scoped token when
    /// the login flow stored one, otherwise the account token.
    pub fn api_token(&self) -> &str {
        if !self.server.token.is_empty() {
            &self.server.token
        } else {
            &self.account.token
        }
    }

    /// Fail fast when the player cannot possibly function.
    pub fn ensure_configured(&self) -> Result<(), NotConfiguredError> {
        if self.server.url.is_empty() || self.api_token().is_empty() {
            return Err(NotConfiguredError);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the Plex Media Server, e.g. `https://1-2-3-4.plex.direct:32400`.
    pub url: String,
    /// Server-scoped access token from the resources listing.
    pub token: String,
    /// Human-readable server name, informational only.
    pub name: String,
    /// Music section id. When empty, the first "artist" section is discovered
    /// on each library fetch.
    pub section_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// plex.tv account token from the pin flow. Fallback when the server
    /// token is absent.
    pub token: String,
    /// Stable client identifier presented to plex.tv. Generated once by the
    /// login flow.
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether to start playing the shuffled library as soon as it loads.
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { autoplay: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `plexdash=debug`.
    /// `PLEXDASH_LOG` overrides this at runtime.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "plexdash=info".to_string(),
        }
    }
}
