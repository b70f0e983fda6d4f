//! plex.tv pin-based login.
//!
//! The flow: create a pin, show the user the activation URL, poll the pin
//! until plex.tv attaches an auth token, then discover the account's media
//! servers and pick a connection. Driven interactively by `plexdash login`.

mod client;
mod models;

pub use client::*;
pub use models::*;
