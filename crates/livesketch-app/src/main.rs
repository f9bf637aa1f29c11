//! Headless replay of a scripted livesketch session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use livesketch_app::{Replay, Script};
use livesketch_core::{BoardConfig, ShortcutRegistry};

/// Replay canvas events across collaborating peers and print the shared documents
#[derive(Parser, Debug)]
#[command(name = "livesketch")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON script of peer steps
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Board configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of peers sharing the board
    #[arg(long, default_value_t = 2)]
    peers: usize,

    /// Print the keyboard shortcuts
    #[arg(long)]
    shortcuts: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.shortcuts {
        print!("{}", ShortcutRegistry::help_text());
    }
    let Some(script_path) = args.script else {
        if args.shortcuts {
            return Ok(());
        }
        anyhow::bail!("No script given (see --help)");
    };

    let config = match &args.config {
        Some(path) => BoardConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BoardConfig::default(),
    };
    let script = Script::load(&script_path)?;

    log::info!("Replaying {} steps across {} peers", script.steps.len(), args.peers);
    let mut replay = Replay::new(args.peers, &config)?;
    replay.run(&script)?;
    replay.sync_all()?;

    println!("{}", serde_json::to_string_pretty(&replay.documents())?);
    if replay.converged() {
        log::info!("All peers converged");
    } else {
        log::warn!("Peers hold different documents");
    }
    Ok(())
}
