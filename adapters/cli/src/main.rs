#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Tillage in a terminal.
//!
//! Each line on stdin is one command. After every committed change the grid
//! is redrawn on stdout; diagnostics go to stderr through `tracing`.

mod catalog;
mod commands;
mod file_store;
mod terminal;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tillage_core::{ChangeReason, Event};
use tillage_rendering::{RenderingBackend, Scene};
use tillage_system_save::{MemoryStore, SaveStore};
use tillage_system_session::Session;
use tillage_world::{query, World, DEFAULT_GRID_WIDTH};
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::CropCatalog;
use commands::{Command, HELP};
use file_store::JsonFileStore;
use terminal::TerminalBackend;

/// Largest grid width accepted on the command line.
const MAX_GRID_WIDTH: u32 = 64;

/// Turn-based farming on a small grid.
#[derive(Debug, Parser)]
#[command(name = "tillage", version, about)]
struct Args {
    /// Number of cells along each edge of the grid.
    #[arg(
        long,
        default_value_t = DEFAULT_GRID_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_GRID_WIDTH))
    )]
    width: u32,
    /// Seed for the world's random source; drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML crop catalog replacing the built-in crops.
    #[arg(long, value_name = "PATH")]
    crops: Option<PathBuf>,
    /// JSON file holding saves; saves are kept in memory when omitted.
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,
    /// Discard every existing save at start-up.
    #[arg(long)]
    fresh: bool,
}

/// Entry point for the Tillage command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let catalog = match &args.crops {
        Some(path) => CropCatalog::load(path)?,
        None => CropCatalog::builtin(),
    };
    let crop = catalog
        .first()
        .cloned()
        .context("crop catalog has no crops")?;

    let mut store: Box<dyn SaveStore> = match &args.store {
        Some(path) => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("failed to open save store at {}", path.display()))?;
            info!(path = %store.path().display(), "using save file");
            Box::new(store)
        }
        None => Box::new(MemoryStore::new()),
    };
    if args.fresh {
        store.clear().context("failed to clear save store")?;
        info!("existing saves discarded");
    }

    let world = match args.seed {
        Some(seed) => World::with_seed(args.width, seed),
        None => World::new(args.width),
    };
    info!(width = args.width, seed = ?args.seed, crop = %crop.kind, "session starting");
    let mut session = Session::new(world, crop);

    let mut terminal = TerminalBackend::new(io::stdout().lock());
    terminal.message(query::welcome_banner(session.world()))?;
    terminal.present(&scene(&session, "type `help` for commands"))?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let command = match commands::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                terminal.message(&format!("{error:#}"))?;
                continue;
            }
        };
        if let Err(error) = apply(command, &mut session, &catalog, store.as_mut(), &mut terminal) {
            terminal.message(&format!("error: {error:#}"))?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn apply<W: Write>(
    command: Command,
    session: &mut Session,
    catalog: &CropCatalog,
    store: &mut dyn SaveStore,
    terminal: &mut TerminalBackend<W>,
) -> Result<()> {
    let mut events = Vec::new();
    match command {
        Command::Input(input) => session.handle_input(input, &mut events)?,
        Command::SelectCrop(name) => {
            let Some(crop) = catalog.get(&name) else {
                bail!("unknown crop `{name}`; type `crops` for a list");
            };
            session.select_crop(crop.clone());
            terminal.message(&format!("sowing {name}"))?;
        }
        Command::ListCrops => {
            for crop in catalog.iter() {
                let marker = if crop == session.selected_crop() { "*" } else { " " };
                terminal.message(&format!(
                    "{marker} {} (sun >= {}, water >= {})",
                    crop.kind, crop.min_sun, crop.min_water
                ))?;
            }
        }
        Command::Undo => {
            if !session.undo(&mut events)? {
                terminal.message("nothing to undo")?;
            }
        }
        Command::Redo => {
            if !session.redo(&mut events)? {
                terminal.message("nothing to redo")?;
            }
        }
        Command::Save(key) => {
            let save = session.save(store, &key)?;
            terminal.message(&format!("saved `{key}` at {}", save.timestamp))?;
        }
        Command::Load(key) => session.load(&*store, &key, &mut events)?,
        Command::Help => terminal.message(HELP)?,
        Command::Quit => {}
    }

    for event in events {
        let Event::StateChanged { reason } = event;
        terminal.present(&scene(session, describe(reason)))?;
    }
    Ok(())
}

fn scene(session: &Session, headline: &str) -> Scene {
    let history = session.history();
    Scene::capture(session.world()).with_status(format!(
        "{headline} | crop {} | undo {} redo {}",
        session.selected_crop().kind,
        history.undo_len(),
        history.redo_len()
    ))
}

fn describe(reason: ChangeReason) -> &'static str {
    match reason {
        ChangeReason::Executed => "done",
        ChangeReason::Undone => "undone",
        ChangeReason::Redone => "redone",
        ChangeReason::Loaded => "loaded",
    }
}
