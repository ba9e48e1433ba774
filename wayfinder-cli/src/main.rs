mod app;
mod command;
mod paths;
mod render;
mod rides;
mod session;
mod settings;

use std::error::Error;
use std::fs::{self, File};

use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::io::{AsyncBufReadExt, BufReader};

use app::{App, Flow};
use session::Session;
use settings::{SettingsStore, SqliteBackend};

/// Environment variable overriding the log level.
const LOG_LEVEL_VAR: &str = "WAYFINDER_LOG";
/// Environment variable seeding the Mapbox token on first start.
const TOKEN_VAR: &str = "MAPBOX_TOKEN";

fn init_logging() {
    paths::rotate_logs();

    let Some(path) = paths::log_file() else {
        eprintln!("Warning: no cache directory, logging disabled");
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }

    let level = std::env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Debug);

    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, Config::default(), file) {
                eprintln!("Warning: failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Warning: failed to create {}: {}", path.display(), e),
    }
}

async fn open_settings() -> Result<SettingsStore, Box<dyn Error>> {
    let path = paths::settings_db().ok_or("could not determine the data directory")?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    log::debug!("Opening settings at {}", path.display());
    Ok(SettingsStore::new(SqliteBackend::new(&path).await?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    init_logging();
    log::info!("Starting wayfinder");

    let session = Session::new(open_settings().await?);
    if session
        .seed_mapbox_token(std::env::var(TOKEN_VAR).ok().as_deref())
        .await?
    {
        log::info!("Stored Mapbox token from {}", TOKEN_VAR);
    }

    let (mut app, mut picked) = App::new(session).await?;
    println!("{}", command::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match app.handle_line(&line).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        log::error!("Command failed: {}", e);
                        eprintln!("Error: {}", e);
                    }
                }
            }
            true = app.changed() => app.render_if_changed(),
            Some(candidate) = picked.recv() => app.on_pick(candidate),
        }
    }

    app.shutdown();
    log::info!("Exiting");
    Ok(())
}
