//! Utilities for creating `rodio` sinks from downloaded stream bytes.
//!
//! The whole track is fetched into memory before decoding: rodio's decoder
//! needs `Read + Seek`, and keeping the bytes around makes seeking a cheap
//! local rebuild instead of a second network round trip.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink, Source};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("server returned {0} for stream")]
    Status(u16),
    #[error("decode failed: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// Downloaded track audio, shared between the playing sink and later seeks.
#[derive(Clone)]
pub(super) struct TrackBuffer(Arc<Vec<u8>>);

impl TrackBuffer {
    pub(super) fn from_vec(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }

    #[cfg(test)]
    pub(super) fn backing(&self) -> &Arc<Vec<u8>> {
        &self.0
    }
}

impl AsRef<[u8]> for TrackBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Fetch the full stream body.
pub(super) fn download(http: &Client, url: &str) -> Result<TrackBuffer, StreamError> {
    let response = http.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::Status(status.as_u16()));
    }
    let bytes = response.bytes()?;
    Ok(TrackBuffer::from_vec(bytes.to_vec()))
}

/// Create a paused `Sink` over `buffer` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    buffer: &TrackBuffer,
    start_at: Duration,
) -> Result<Sink, StreamError> {
    // `skip_duration` is the seeking primitive; even Duration::ZERO is fine.
    let source = Decoder::new(Cursor::new(buffer.clone()))?.skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
