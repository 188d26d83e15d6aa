//! # Place CLI: Validate place writes against a snapshot.
//!
//! Runs a create or update through the write pipeline and prints the
//! normalized record. With `--write` the accepted record is saved back
//! into the snapshot.
//!
//! ```bash
//! atlas place create kemer.yaml --store atlas.yaml
//! atlas place update kemer-coords.yaml --store atlas.yaml --id 12 --write
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use atlas_core::RecordId;
use atlas_hierarchy::{EngineConfig, PlaceStore, PlaceWrite, PlaceWriteEngine};

use crate::{load_store, read_document, render, save_store, OutputFormat};

/// Place subcommand arguments.
#[derive(Args, Debug)]
pub struct PlaceArgs {
    #[command(subcommand)]
    pub command: PlaceCommand,
}

/// Available place subcommands.
#[derive(Subcommand, Debug)]
pub enum PlaceCommand {
    /// Validate a new place.
    Create {
        /// Place write document (YAML or JSON).
        file: PathBuf,

        /// Snapshot file.
        #[arg(long)]
        store: PathBuf,

        /// Save the accepted place into the snapshot.
        #[arg(long)]
        write: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Validate an update of a stored place.
    Update {
        /// Place write document carrying only the changed fields.
        file: PathBuf,

        /// Snapshot file.
        #[arg(long)]
        store: PathBuf,

        /// Record id of the place to update.
        #[arg(long)]
        id: u64,

        /// Save the accepted place into the snapshot.
        #[arg(long)]
        write: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

/// Execute the place subcommand.
pub fn run_place(args: &PlaceArgs, config: &EngineConfig) -> Result<u8> {
    match &args.command {
        PlaceCommand::Create {
            file,
            store,
            write,
            format,
        } => run_write(file, store, None, *write, *format, config),
        PlaceCommand::Update {
            file,
            store,
            id,
            write,
            format,
        } => run_write(file, store, Some(RecordId(*id)), *write, *format, config),
    }
}

fn run_write(
    file: &Path,
    store_path: &Path,
    id: Option<RecordId>,
    write: bool,
    format: OutputFormat,
    config: &EngineConfig,
) -> Result<u8> {
    let candidate: PlaceWrite = read_document(file)?;
    let mut store = load_store(store_path)?;

    let existing = match id {
        Some(id) => match store.place_by_id(id)? {
            Some(place) => Some(place),
            None => bail!("no stored place with id {id}"),
        },
        None => None,
    };

    let engine = PlaceWriteEngine::new(&store, config);
    let result = match &existing {
        Some(existing) => engine.on_update(&candidate, existing),
        None => engine.on_create(&candidate),
    };
    let place = match result {
        Ok(place) => place,
        Err(e) => {
            eprintln!("error[{}]: {e}", e.kind().as_str());
            return Ok(1);
        }
    };
    print!("{}", render(&place, format)?);

    if write {
        let saved = match id {
            Some(id) => {
                store.apply_update(id, place);
                id
            }
            None => store.apply_create(place),
        };
        save_store(store_path, &store)?;
        tracing::info!(record = %saved, path = %store_path.display(), "saved place");
    }
    Ok(0)
}
