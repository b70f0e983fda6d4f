use std::sync::mpsc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::PlexClient;
use crate::config::Settings;
use crate::mpris::ControlCmd;
use crate::player::{Player, PlayerEvent};

mod event_loop;
mod fetch;
pub mod login;
mod session;


/// Wire everything up and run until Quit: config, logging, the audio thread,
/// the MPRIS service, the fetch worker and the event loop that owns the
/// queue.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_tracing(&settings);
    settings.ensure_configured()?;

    info!(
        server = %settings.server.name,
        url = %settings.server.url,
        "starting plexdash"
    );

    let client = PlexClient::new(&settings.server.url, settings.api_token())?;

    let (events_tx, events_rx) = mpsc::channel::<PlayerEvent>();
    let player = Player::new(events_tx);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    let (fetch_tx, requests_rx) = mpsc::channel();
    let (results_tx, fetch_rx) = mpsc::channel();
    fetch::spawn_fetch_worker(
        client.clone(),
        settings.server.section_id.clone(),
        requests_rx,
        results_tx,
    );

    // Boot straight into a shuffled library.
    let _ = fetch_tx.send(fetch::FetchRequest::ShuffleAll {
        autoplay: settings.playback.autoplay,
    });

    let mut state = event_loop::EventLoopState::new();
    let result = event_loop::run(
        &client,
        &player,
        &mpris,
        &control_rx,
        &events_rx,
        &fetch_tx,
        &fetch_rx,
        &mut state,
    );

    player.quit();
    result
}

/// `PLEXDASH_LOG` wins over the configured filter so a shell can turn on
/// debug output without touching the config file.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_env("PLEXDASH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
