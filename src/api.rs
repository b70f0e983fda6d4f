//! Plex Media Server client: wire models and the track source.
//!
//! Everything the player knows about music comes from here — library
//! sections, the full track list of a section, and the tracks of a single
//! album. Stream and artwork URLs are derived locally from the server URL
//! and token, no network call involved.

mod client;
mod models;

pub use client::*;
pub use models::*;
