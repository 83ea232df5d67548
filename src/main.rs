//! Nowplaying - prints the consolidated "now playing" status of MPRIS players
//! and forwards playback commands read from stdin.

use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use nowplaying::{
    config::Config,
    services::{MprisService, PlayerCommand, StatusChange},
    tracing_config,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "nowplaying")]
#[command(about = "Follow the most recently active MPRIS media player")]
struct Cli {
    /// Read the configuration from this file instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one line per status change; reads toggle/next/prev/stop from stdin
    Watch {
        /// Print each status as a JSON object
        #[arg(long)]
        json: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { json } => {
            let config = match cli.config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            tracing_config::init(&config.general)?;
            watch(&config, json).await?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(Config);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

async fn watch(config: &Config, json: bool) -> Result<(), Box<dyn Error>> {
    let mut service = MprisService::start(&config.media, move |change: StatusChange| {
        print_status(&change, json);
    })
    .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    let Some(command) = parse_command(&line) else {
                        if !line.trim().is_empty() {
                            warn!(input = %line.trim(), "Unknown command");
                        }
                        continue;
                    };
                    service.request(command)?;
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    stdin_open = false;
                }
            },
        }
    }

    service.shutdown().await;
    Ok(())
}

fn parse_command(line: &str) -> Option<PlayerCommand> {
    match line.trim() {
        "toggle" | "play-pause" => Some(PlayerCommand::PlayPause),
        "next" => Some(PlayerCommand::Next),
        "prev" | "previous" => Some(PlayerCommand::Previous),
        "stop" => Some(PlayerCommand::Stop),
        _ => None,
    }
}

fn print_status(change: &StatusChange, json: bool) {
    if json {
        match serde_json::to_string(change) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to serialize status: {e}"),
        }
        return;
    }

    if change.is_idle() {
        println!("[idle] nothing playing");
        return;
    }

    let player = change.player.as_ref().map(ToString::to_string).unwrap_or_default();
    let track = change.track.clone().unwrap_or_default();
    println!(
        "[{}] {} - {} ({player})",
        change.state, track.title, track.artist
    );
}
