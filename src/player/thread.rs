use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use super::sink::{TrackBuffer, create_sink_at, download};
use super::types::{PlaybackHandle, PlayerCmd, PlayerEvent};

const TICK: Duration = Duration::from_millis(500);
const POLL: Duration = Duration::from_millis(200);

pub(super) fn spawn_player_thread(
    rx: Receiver<PlayerCmd>,
    events_tx: Sender<PlayerEvent>,
    playback_info: PlaybackHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream =
            OutputStreamBuilder::open_default_stream().expect("ERR: No audio output device");
        // rodio logs to stderr when OutputStream is dropped; quiet that down.
        stream.log_on_drop(false);

        // No total request timeout: long tracks legitimately take a while to
        // download. The connect timeout still bounds a dead server.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("plexdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("ERR: failed to build HTTP client");

        let mut sink: Option<Sink> = None;
        let mut current: Option<TrackBuffer> = None;
        let mut paused = true;
        let mut ended_notified = false;

        // Ticker thread updates shared elapsed time while playing.
        let info_for_ticker = playback_info.clone();
        thread::spawn(move || {
            loop {
                thread::sleep(TICK);
                if let Ok(mut info) = info_for_ticker.lock() {
                    if info.playing {
                        info.elapsed += TICK;
                    }
                }
            }
        });

        let set_info = |elapsed: Option<Duration>, playing: bool| {
            if let Ok(mut info) = playback_info.lock() {
                if let Some(e) = elapsed {
                    info.elapsed = e;
                }
                info.playing = playing;
            }
        };

        loop {
            match rx.recv_timeout(POLL) {
                Ok(PlayerCmd::Play(url)) => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }

                    let started = download(&http, &url)
                        .and_then(|buffer| {
                            let s = create_sink_at(&stream, &buffer, Duration::ZERO)?;
                            Ok((buffer, s))
                        })
                        .map(|(buffer, s)| {
                            s.play();
                            current = Some(buffer);
                            sink = Some(s);
                        });

                    match started {
                        Ok(()) => {
                            paused = false;
                            ended_notified = false;
                            set_info(Some(Duration::ZERO), true);
                            debug!("playback started");
                        }
                        Err(e) => {
                            warn!(error = %e, "could not start stream");
                            current = None;
                            set_info(Some(Duration::ZERO), false);
                        }
                    }
                }

                Ok(PlayerCmd::Pause) => {
                    if let Some(ref s) = sink {
                        s.pause();
                        paused = true;
                        set_info(None, false);
                    }
                }

                Ok(PlayerCmd::Resume) => {
                    if let Some(ref s) = sink {
                        s.play();
                        paused = false;
                        set_info(None, true);
                    }
                }

                Ok(PlayerCmd::Stop) => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    current = None;
                    paused = true;
                    ended_notified = false;
                    set_info(Some(Duration::ZERO), false);
                }

                Ok(PlayerCmd::SeekTo(pos)) => {
                    // Rebuild the sink from the cached bytes at the target
                    // position, preserving the paused state.
                    if let Some(ref buffer) = current {
                        match create_sink_at(&stream, buffer, pos) {
                            Ok(new_sink) => {
                                if let Some(s) = sink.take() {
                                    s.stop();
                                }
                                if !paused {
                                    new_sink.play();
                                }
                                sink = Some(new_sink);
                                ended_notified = false;
                                set_info(Some(pos), !paused);
                            }
                            Err(e) => warn!(error = %e, "seek failed"),
                        }
                    }
                }

                Ok(PlayerCmd::Quit) => {
                    if let Some(ref s) = sink {
                        s.stop();
                    }
                    break;
                }

                Err(RecvTimeoutError::Timeout) => {
                    // Detect end of track: the sink drained while playing.
                    if let Some(ref s) = sink {
                        if !paused && s.empty() && !ended_notified {
                            ended_notified = true;
                            set_info(None, false);
                            let _ = events_tx.send(PlayerEvent::TrackEnded);
                        }
                    }
                }

                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
