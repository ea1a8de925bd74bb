use anyhow::Context;
use clap::{Parser, Subcommand};
use gridturn_common::{GameConfig, Position};
use gridturn_game::Game;
use gridturn_kernel::{EventKind, ExecutionConfig, GameEvent, TurnOrdering};
use gridturn_render::TileCatalog;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridturn", about = "Turn-based grid world engine", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML game config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the config's save directory
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,

    /// YAML glyph table layered over the built-in one
    #[arg(long, global = true)]
    glyphs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new world and save it
    New {
        save: String,
        /// Turn-order seed
        #[arg(long)]
        seed: Option<u32>,
        /// Side length of the world grid
        #[arg(long)]
        world_size: Option<u32>,
    },
    /// Execute a JSON batch of actions against a save
    Exec {
        save: String,
        /// Read the batch from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Stop at the first failed action
        #[arg(long)]
        atomic: bool,
        /// Let any queued player act, not just the front of a queue
        #[arg(long)]
        lenient: bool,
        /// Do not write the resulting state back
        #[arg(long, conflicts_with = "save_as")]
        no_save: bool,
        /// Write the resulting state under another name
        #[arg(long)]
        save_as: Option<String>,
        /// Print resulting events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a player's view; all players when no id is given
    View {
        save: String,
        #[arg(short, long)]
        player: Option<String>,
    },
    /// Preview a batch without executing it
    Explain {
        save: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Describe the tile at a world position
    Inspect {
        save: String,
        #[arg(allow_hyphen_values = true)]
        x: i32,
        #[arg(allow_hyphen_values = true)]
        y: i32,
    },
    /// List registered actions and their parameters
    Actions,
    /// List saves in the save directory
    Saves,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(dir) = cli.save_dir {
        config.save_dir = dir;
    }
    if let Commands::New { seed, world_size, .. } = &cli.command {
        if let Some(seed) = seed {
            config.seed = *seed;
        }
        if let Some(size) = world_size {
            config.world_size = *size;
        }
    }

    tracing::debug!(
        version = %config.version,
        save_dir = %config.save_dir.display(),
        world_size = config.world_size,
        metric = config.distance_function.name(),
        "config resolved"
    );

    let glyphs = match &cli.glyphs {
        Some(path) => TileCatalog::load(path).with_context(|| format!("loading glyph table {}", path.display()))?,
        None => TileCatalog::default(),
    };
    let game = Game::with_glyphs(config, glyphs)?;

    match cli.command {
        Commands::New { save, .. } => {
            let state = game.init()?;
            let path = game.save(&state, &save)?;
            println!(
                "created '{save}' ({0}x{0}, {1} players) at {2}",
                state.metadata.world_size,
                state.players.len(),
                path.display()
            );
        }
        Commands::Exec {
            save,
            file,
            atomic,
            lenient,
            no_save,
            save_as,
            json,
        } => {
            let batch = read_batch(file.as_deref())?;
            let exec = ExecutionConfig {
                atomic,
                ordering: if lenient {
                    TurnOrdering::Lenient
                } else {
                    TurnOrdering::Strict
                },
                save_name: if no_save { None } else { Some(save_as.unwrap_or_else(|| save.clone())) },
            };
            let (state, report) = game.execute_json(&save, &batch, &exec)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.events)?);
            } else {
                for event in &report.events {
                    println!("{}", summarize(event));
                }
                println!(
                    "{} succeeded, {} failed; turn {}",
                    report.succeeded(),
                    report.failed(),
                    state.turn
                );
            }
        }
        Commands::View { save, player } => {
            println!("{}", game.render_view(&save, player.as_deref())?);
        }
        Commands::Explain { save, file } => {
            let batch = read_batch(file.as_deref())?;
            for line in game.explain(&save, &batch)? {
                println!("{line}");
            }
        }
        Commands::Inspect { save, x, y } => {
            println!("{}", game.inspect(&save, Position::new(x, y))?);
        }
        Commands::Actions => {
            print!("{}", game.describe_actions());
        }
        Commands::Saves => {
            for name in game.store().list()? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn read_batch(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading batch {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading batch from stdin")?;
            Ok(text)
        }
    }
}

fn summarize(event: &GameEvent) -> String {
    let EventKind::PlayerAction { player_id, action } = &event.kind else {
        return format!("system event {}", event.id);
    };
    match &event.error {
        None => {
            let effects: Vec<String> = event.effects.iter().map(ToString::to_string).collect();
            format!("ok      {player_id} {}: {}", action.kind(), effects.join("; "))
        }
        Some(error) => format!("FAILED  {player_id} {}: {error}", action.kind()),
    }
}
