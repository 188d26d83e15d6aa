//! # Profile CLI: Resolve, list, and normalize country profiles.
//!
//! ```bash
//! # Effective profile for Turkey, merged with any stored record:
//! atlas profile resolve TR --store atlas.yaml --format json
//!
//! # Countries with a compiled-in table:
//! atlas profile countries
//!
//! # Normalize an edited profile and save it into the snapshot:
//! atlas profile normalize tr-profile.yaml --store atlas.yaml --existing-id 1 --write
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use atlas_core::RecordId;
use atlas_hierarchy::MemoryStore;
use atlas_profile::{builtin, normalize_profile, CountryProfileResolver, ProfileDraft, ProfileSource};

use crate::{country_arg, load_store, read_document, render, save_store, OutputFormat};

/// Profile subcommand arguments.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

/// Available profile subcommands.
#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Print the effective profile for a country.
    Resolve {
        /// Two-letter country code.
        country: String,

        /// Explicit stored profile to merge.
        #[arg(long)]
        profile_id: Option<u64>,

        /// Snapshot file holding stored profiles.
        #[arg(long)]
        store: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// List countries with a compiled-in table.
    Countries,

    /// Normalize a profile document.
    Normalize {
        /// Profile draft (YAML or JSON).
        file: PathBuf,

        /// Snapshot file to read the stored record from.
        #[arg(long)]
        store: Option<PathBuf>,

        /// Id of the stored profile being updated.
        #[arg(long, requires = "store")]
        existing_id: Option<u64>,

        /// Save the normalized profile into the snapshot.
        #[arg(long, requires = "store")]
        write: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

/// Execute the profile subcommand.
pub fn run_profile(args: &ProfileArgs) -> Result<u8> {
    match &args.command {
        ProfileCommand::Resolve {
            country,
            profile_id,
            store,
            format,
        } => run_resolve(country, profile_id.map(RecordId), store.as_deref(), *format),
        ProfileCommand::Countries => run_countries(),
        ProfileCommand::Normalize {
            file,
            store,
            existing_id,
            write,
            format,
        } => run_normalize(file, store.as_deref(), existing_id.map(RecordId), *write, *format),
    }
}

fn run_resolve(country: &str, profile_id: Option<RecordId>, store: Option<&Path>, format: OutputFormat) -> Result<u8> {
    let country = country_arg(country)?;
    let store = match store {
        Some(path) => load_store(path)?,
        None => MemoryStore::new(),
    };
    match CountryProfileResolver::new(&store).resolve(&country, profile_id) {
        Ok(profile) => {
            print!("{}", render(&profile, format)?);
            Ok(0)
        }
        Err(e) => {
            eprintln!("error[{}]: {e}", e.kind().as_str());
            Ok(1)
        }
    }
}

fn run_countries() -> Result<u8> {
    println!("Countries with built-in profiles:");
    println!();
    for country in builtin::available_countries() {
        println!("  {:<4} {}", country.country_code, country.name);
    }
    println!();
    println!("Total: {} countries", builtin::available_countries().len());
    Ok(0)
}

fn run_normalize(
    file: &Path,
    store_path: Option<&Path>,
    existing_id: Option<RecordId>,
    write: bool,
    format: OutputFormat,
) -> Result<u8> {
    let draft: ProfileDraft = read_document(file)?;
    let mut store = match store_path {
        Some(path) => load_store(path)?,
        None => MemoryStore::new(),
    };

    let existing = match existing_id {
        Some(id) => match store.profile_by_id(id)? {
            Some(profile) => Some(profile),
            None => bail!("no stored country profile with id {id}"),
        },
        None => None,
    };
    let id = existing_id.unwrap_or_else(|| store.next_id());

    let profile = match normalize_profile(id, &draft, existing.as_ref()) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("error[{}]: {e}", e.kind().as_str());
            return Ok(1);
        }
    };
    print!("{}", render(&profile, format)?);

    if write {
        let path = store_path.context("--write requires --store")?;
        store.insert_profile(profile);
        save_store(path, &store)?;
        tracing::info!(profile_id = %id, path = %path.display(), "saved country profile");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &str = "country_profiles:\n  - id: 1\n    country_code: TR\n    city_like_levels: [city]\n";

    fn store_file() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("atlas.yaml"), STORE).unwrap();
        dir
    }

    #[test]
    fn resolve_without_store_uses_builtins() {
        assert_eq!(run_resolve("tr", None, None, OutputFormat::Json).unwrap(), 0);
    }

    #[test]
    fn resolve_rejects_foreign_profile() {
        let dir = store_file();
        let path = dir.path().join("atlas.yaml");
        assert_eq!(run_resolve("US", Some(RecordId(1)), Some(&path), OutputFormat::Yaml).unwrap(), 1);
    }

    #[test]
    fn resolve_rejects_bad_country_code() {
        assert!(run_resolve("Turkey", None, None, OutputFormat::Yaml).is_err());
    }

    #[test]
    fn countries_lists_builtins() {
        assert_eq!(run_countries().unwrap(), 0);
    }

    #[test]
    fn normalize_and_write_new_profile() {
        let dir = store_file();
        let path = dir.path().join("atlas.yaml");
        let draft = dir.path().join("us.yaml");
        std::fs::write(&draft, "country_code: us\nlabel_mapping: {admin1: State}\n").unwrap();

        assert_eq!(run_normalize(&draft, Some(&path), None, true, OutputFormat::Yaml).unwrap(), 0);

        let store = load_store(&path).unwrap();
        let saved = store.profile_by_country(&country_arg("US").unwrap()).unwrap().unwrap();
        assert_eq!(saved.id, RecordId(2));
        assert!(saved.policy.enabled_levels.contains(&atlas_core::PlaceType::Country));
        assert_eq!(saved.policy.label_mapping[&atlas_core::PlaceType::Admin1], "State");
    }

    #[test]
    fn normalize_update_keeps_stored_fields() {
        let dir = store_file();
        let path = dir.path().join("atlas.yaml");
        let draft = dir.path().join("tr.json");
        std::fs::write(&draft, r#"{"label_mapping": {"admin1": "Il"}}"#).unwrap();

        assert_eq!(run_normalize(&draft, Some(&path), Some(RecordId(1)), true, OutputFormat::Json).unwrap(), 0);
        let store = load_store(&path).unwrap();
        let saved = store.profile_by_id(RecordId(1)).unwrap().unwrap();
        assert_eq!(saved.policy.city_like_levels, [atlas_core::PlaceType::City]);
    }

    #[test]
    fn normalize_reports_invalid_profile() {
        let dir = store_file();
        let draft = dir.path().join("bad.yaml");
        std::fs::write(&draft, "country_code: TR\nenabled_levels: []\n").unwrap();
        assert_eq!(run_normalize(&draft, None, None, false, OutputFormat::Yaml).unwrap(), 1);
    }

    #[test]
    fn normalize_unknown_existing_id_errors() {
        let dir = store_file();
        let path = dir.path().join("atlas.yaml");
        let draft = dir.path().join("tr.yaml");
        std::fs::write(&draft, "country_code: TR\n").unwrap();
        assert!(run_normalize(&draft, Some(&path), Some(RecordId(9)), false, OutputFormat::Yaml).is_err());
    }
}
