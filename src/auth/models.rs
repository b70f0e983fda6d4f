use serde::Deserialize;

/// A pin as created/polled at `plex.tv/api/v2/pins`. `auth_token` stays
/// `None` until the user approves the pin in a browser.
#[derive(Debug, Clone, Deserialize)]
pub struct Pin {
    pub id: i64,
    pub code: String,
    #[serde(rename = "authToken", default)]
    pub auth_token: Option<String>,
}

/// A device from `plex.tv/api/v2/resources`. Media servers advertise
/// "server" in `provides`; other entries are clients and players.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub provides: String,
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Resource {
    pub fn is_server(&self) -> bool {
        self.provides.split(',').any(|p| p == "server")
    }
}

/// One way of reaching a resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    pub protocol: String,
    pub address: String,
    pub port: u16,
    pub uri: String,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub relay: bool,
}

/// Pick the connection to store in the config.
///
/// Preference: https-remote, http-remote, https-local, http-local, then
/// whatever is listed first. Remote wins because a head unit roams between
/// networks; the local address only works at home.
pub fn choose_connection(resource: &Resource) -> Option<&Connection> {
    let pick = |proto: &str, local: bool| {
        resource
            .connections
            .iter()
            .find(|c| c.protocol == proto && c.local == local)
    };

    pick("https", false)
        .or_else(|| pick("http", false))
        .or_else(|| pick("https", true))
        .or_else(|| pick("http", true))
        .or_else(|| resource.connections.first())
}
