//! # qbt
//!
//! Lists the torrents of a qBittorrent instance through its Web API.
//!
//! ## Usage
//!
//! ```sh,ignore
//! qbt --url http://localhost:8080 --username admin --filter downloading --detailed
//! ```

mod cli;
mod display;

use std::{
    error::Error,
    io::{self, BufRead, Write},
    process::ExitCode,
};

use clap::Parser;
use tracing::{error, info_span};
use tracing_subscriber::EnvFilter;

use qbt_client::{ApiClient, CredentialsManager};
use qbt_types::{Torrent, TorrentFilter};

use crate::cli::Cli;

/// Initializes the tracing subscriber. `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reads a line from stdin after printing `label`.
fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let credentials = CredentialsManager::new();

    if cli.clear_cached_credentials {
        if credentials.clear() {
            println!("Cached credentials cleared successfully.");
        } else {
            println!("No cached credentials found.");
        }
        return Ok(());
    }

    let resolved = credentials.resolve(
        cli.url.as_deref(),
        cli.username.as_deref(),
        cli.password.as_deref(),
    );
    let username = match resolved.username {
        Some(username) => username,
        None => prompt("Username: ")?,
    };
    let password = match resolved.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };

    let mut client =
        ApiClient::new(&resolved.url)?.with_span(info_span!("webui", url = %resolved.url));

    if !client.login(&username, &password)? {
        return Err("login rejected: no session cookie received".into());
    }

    if cli.cache_credentials {
        if credentials.save(&resolved.url, &username, &password) {
            println!("Credentials cached successfully.");
        } else {
            println!("Failed to cache credentials.");
        }
    }

    let api_version = client.get_api_version()?;
    let app_version = client.get_app_version()?;
    println!("Connected to qBittorrent {app_version} (API v{api_version})");

    let filter = TorrentFilter::from(cli.filter);
    let torrents: Vec<Torrent> = client
        .list_torrents(filter, &cli.list_options())?
        .into_iter()
        .map(Torrent::new)
        .collect();

    if torrents.is_empty() {
        println!("No torrents found.");
    } else {
        println!("Found {} torrents:", torrents.len());
        println!("{}", "-".repeat(60));
        for torrent in &torrents {
            print!("{}", display::render_torrent(torrent, cli.detailed));
            println!();
        }
    }

    client.logout()?;
    Ok(())
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
