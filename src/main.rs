use std::env;
use std::process::ExitCode;

mod api;
mod auth;
mod config;
mod mpris;
mod player;
mod queue;
mod runtime;

fn main() -> ExitCode {
    let result = match env::args().nth(1).as_deref() {
        Some("login") => runtime::login::run(),
        Some(other) => {
            eprintln!("unknown command: {other}");
            eprintln!("usage: plexdash [login]");
            return ExitCode::FAILURE;
        }
        None => runtime::run(),
    };

    if let Err(e) = result {
        eprintln!("plexdash: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
