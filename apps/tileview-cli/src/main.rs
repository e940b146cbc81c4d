use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tileview_assets::{ModelLibrary, TextureSet};
use tileview_engine::{Engine, EngineConfig};
use tileview_kernel::World;
use tileview_persist::FileStore;
use tileview_render::RecordingBackend;
use tileview_tools::{WorldInspector, sample_world};

#[derive(Parser)]
#[command(name = "tileview-cli", about = "CLI tool for tileview maps")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration (JSON); missing fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// World document (JSON); a generated sample world is used otherwise
    #[arg(short, long, global = true)]
    world: Option<PathBuf>,

    /// Resolution of the generated sample world
    #[arg(short, long, global = true, default_value = "16")]
    resolution: u32,

    /// Directory persisting the camera between runs
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, texture and model info
    Info,
    /// Summarize the world, or one tile of it
    Inspect {
        #[arg(long, requires = "y")]
        x: Option<i32>,
        #[arg(long, requires = "x")]
        y: Option<i32>,
    },
    /// Draw one frame headless and print what was presented
    Render {
        /// Pan by DX,DY surface pixels before drawing
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        pan: Option<(f32, f32)>,
        /// Zoom steps; positive zooms in, negative zooms out
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        zoom: i32,
        /// Print the presented frame as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report the tile under a screen position
    Pick { x: f32, y: f32 },
    /// List the voxel models
    Models,
}

fn parse_pair(text: &str) -> Result<(f32, f32), String> {
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got {text:?}"))?;
    let parse = |s: &str| s.trim().parse::<f32>().map_err(|e| format!("{s:?}: {e}"));
    Ok((parse(a)?, parse(b)?))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_world(path: Option<&Path>, resolution: u32) -> anyhow::Result<World> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading world {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing world {}", path.display()))
        }
        None => {
            tracing::info!(resolution, "no world given, generating sample");
            Ok(sample_world(resolution)?)
        }
    }
}

/// Engine with every texture marked loaded and the world drawn once.
fn open_engine(cli: &Cli, world: World) -> anyhow::Result<Engine<RecordingBackend>> {
    let config = load_config(cli.config.as_deref())?;
    let mut engine = Engine::with_defaults(config, RecordingBackend::new())?;
    if let Some(dir) = &cli.store {
        let store = FileStore::open(dir).with_context(|| format!("opening store {}", dir.display()))?;
        engine = engine.with_store(Box::new(store));
    }
    for ticket in engine.begin_preload() {
        ticket.complete();
    }
    engine.load_world(world);
    Ok(engine)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Info => {
            let textures = TextureSet::standard();
            let models = ModelLibrary::builtin()?;
            println!("tileview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "textures: {} kinds, {} resources",
                textures.len(),
                textures.resource_count()
            );
            println!("models: {}", models.names().collect::<Vec<_>>().join(", "));
        }
        Commands::Inspect { x, y } => {
            let world = load_world(cli.world.as_deref(), cli.resolution)?;
            match (x, y) {
                (Some(x), Some(y)) => match WorldInspector::inspect_tile(&world, *x, *y) {
                    Some(info) => println!("{info}"),
                    None => println!("no tile at {x}, {y}"),
                },
                _ => println!("{}", WorldInspector::summary(&world)),
            }
        }
        Commands::Render { pan, zoom, json } => {
            let world = load_world(cli.world.as_deref(), cli.resolution)?;
            let mut engine = open_engine(&cli, world)?;
            if let Some((dx, dy)) = pan {
                engine.move_by(*dx, *dy);
            }
            for _ in 0..zoom.unsigned_abs() {
                if *zoom > 0 {
                    engine.zoom_in();
                } else {
                    engine.zoom_out();
                }
            }
            let outcome = engine.redraw(true);
            tracing::info!(?outcome, cache_hits = engine.cache().hits(), "frame drawn");
            let frame = engine
                .backend()
                .presented()
                .context("no frame was presented")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(frame)?);
            } else {
                print!("{}", frame.dump());
            }
        }
        Commands::Pick { x, y } => {
            let world = load_world(cli.world.as_deref(), cli.resolution)?;
            let engine = open_engine(&cli, world)?;
            match engine.tile_at_screen_position(*x, *y) {
                Some(picked) => {
                    let t = picked.tile;
                    println!("{} at {} (height {})", t.kind, t.pos(), t.height);
                    if let Some(b) = picked.building {
                        println!("building: {} (size {})", b.kind, b.size);
                    }
                }
                None => println!("no tile under {x}, {y}"),
            }
        }
        Commands::Models => {
            let models = ModelLibrary::builtin()?;
            for model in models.iter() {
                println!("{}", WorldInspector::model(model));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_parsing() {
        assert_eq!(parse_pair("10,-5.5").unwrap(), (10.0, -5.5));
        assert_eq!(parse_pair(" 1 , 2 ").unwrap(), (1.0, 2.0));
        assert!(parse_pair("10").is_err());
        assert!(parse_pair("a,b").is_err());
    }

    #[test]
    fn cli_parses_render() {
        let cli = Cli::try_parse_from(["tileview-cli", "render", "--pan", "-10,20", "--zoom", "-2"])
            .unwrap();
        match cli.command {
            Commands::Render { pan, zoom, json } => {
                assert_eq!(pan, Some((-10.0, 20.0)));
                assert_eq!(zoom, -2);
                assert!(!json);
            }
            _ => panic!("expected render"),
        }
        assert_eq!(cli.resolution, 16);
    }

    #[test]
    fn sample_engine_draws() {
        let cli = Cli::try_parse_from(["tileview-cli", "-r", "6", "pick", "10", "10"]).unwrap();
        let world = load_world(None, cli.resolution).unwrap();
        let engine = open_engine(&cli, world).unwrap();
        assert!(engine.backend().presented().is_some());
        assert!(engine.tile_at_screen_position(10.0, 10.0).is_some());
    }
}
