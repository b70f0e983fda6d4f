//! Interactive `plexdash login`: pin auth against plex.tv, server pick,
//! config write.

use std::io::{self, BufRead, Write};

use tracing::debug;
use uuid::Uuid;

use crate::auth::{
    PIN_POLL_ATTEMPTS, PIN_POLL_DELAY, PlexAuthClient, Resource, choose_connection,
};
use crate::config::Settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load()?;

    if settings.account.client_id.is_empty() {
        settings.account.client_id = Uuid::new_v4().to_string();
        debug!(client_id = %settings.account.client_id, "generated client identifier");
    }

    let auth = PlexAuthClient::new(&settings.account.client_id)?;

    let pin = auth.create_pin()?;
    println!("Open this URL in a browser and sign in:");
    println!("\n  {}\n", auth.auth_url(&pin));
    println!("Link code: {}", pin.code);
    println!("Waiting for approval...");

    let token = auth.poll_for_token(pin.id, &pin.code, PIN_POLL_ATTEMPTS, PIN_POLL_DELAY)?;
    println!("Signed in.");

    let servers = auth.servers(&token)?;
    let server = pick_server(&servers)?;
    let connection =
        choose_connection(server).ok_or("selected server has no usable connection")?;

    settings.server.url = connection.uri.clone();
    settings.server.token = server.access_token.clone().unwrap_or_default();
    settings.server.name = server.name.clone();
    settings.account.token = token;

    let path = settings.store()?;
    println!(
        "Using \"{}\" at {}.\nConfiguration written to {}",
        server.name,
        connection.uri,
        path.display()
    );
    Ok(())
}

/// One server is taken as-is; more than one gets a numbered prompt.
fn pick_server(servers: &[Resource]) -> Result<&Resource, Box<dyn std::error::Error>> {
    if servers.len() == 1 {
        return Ok(&servers[0]);
    }

    println!("Found {} servers:", servers.len());
    for (i, server) in servers.iter().enumerate() {
        println!("  [{}] {}", i + 1, server.name);
    }
    print!("Pick one [1-{}]: ", servers.len());
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let index: usize = line.trim().parse()?;

    servers
        .get(index.checked_sub(1).ok_or("invalid selection")?)
        .ok_or_else(|| "invalid selection".into())
}
