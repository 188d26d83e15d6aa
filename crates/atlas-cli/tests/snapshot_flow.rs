//! Builds a small hierarchy through the public handlers and audits it.

use std::path::{Path, PathBuf};

use atlas_cli::audit::{run_audit, AuditArgs};
use atlas_cli::place::{run_place, PlaceArgs, PlaceCommand};
use atlas_cli::profile::{run_profile, ProfileArgs, ProfileCommand};
use atlas_cli::{load_store, OutputFormat};
use atlas_hierarchy::{EngineConfig, PlaceStore};

const SEED: &str = r#"
region_groups:
  - {id: 1, region_key: tr-mediterranean-region, country_code: TR}
places: []
"#;

fn create(dir: &Path, store: &Path, name: &str, body: &str) -> u8 {
    let file = dir.join(name);
    std::fs::write(&file, body).unwrap();
    let args = PlaceArgs {
        command: PlaceCommand::Create {
            file,
            store: store.to_path_buf(),
            write: true,
            format: OutputFormat::Json,
        },
    };
    run_place(&args, &EngineConfig::default()).unwrap()
}

fn audit(store: PathBuf) -> u8 {
    run_audit(&AuditArgs { store, format: None }, &EngineConfig::default()).unwrap()
}

#[test]
fn build_hierarchy_then_audit_clean() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("atlas.yaml");
    std::fs::write(&store, SEED).unwrap();

    let draft = dir.path().join("tr-profile.yaml");
    std::fs::write(
        &draft,
        "country_code: TR\nregion_auto_assign:\n  by_admin1_place_id: {admin1-tr-antalya: tr-mediterranean-region}\n",
    )
    .unwrap();
    let normalize = ProfileArgs {
        command: ProfileCommand::Normalize {
            file: draft,
            store: Some(store.clone()),
            existing_id: None,
            write: true,
            format: OutputFormat::Yaml,
        },
    };
    assert_eq!(run_profile(&normalize).unwrap(), 0);

    assert_eq!(
        create(dir.path(), &store, "tr.yaml", "place_id: country-tr\nplace_type: country\ncountry_code: TR\nslug: turkey\n"),
        0
    );
    assert_eq!(
        create(
            dir.path(),
            &store,
            "antalya.yaml",
            "place_id: admin1-tr-antalya\nplace_type: admin1\ncountry_code: TR\nparent_place_id: country-tr\nslug: antalya-province\n",
        ),
        0
    );
    assert_eq!(
        create(
            dir.path(),
            &store,
            "kemer.yaml",
            "place_id: city-tr-kemer\nplace_type: city\ncountry_code: TR\nparent_place_id: admin1-tr-antalya\nslug: kemer\nlat: 36.6\nlng: 30.55\n",
        ),
        0
    );

    let loaded = load_store(&store).unwrap();
    assert_eq!(loaded.places().count(), 3);
    let kemer = loaded
        .place_by_place_id(&atlas_core::PlaceId::new("city-tr-kemer").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(kemer.region.as_ref().unwrap().as_str(), "tr-mediterranean-region");
    assert_eq!(kemer.lat, Some(36.6));

    assert_eq!(audit(store), 0);
}

#[test]
fn rejected_create_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("atlas.yaml");
    std::fs::write(&store, SEED).unwrap();

    let code = create(
        dir.path(),
        &store,
        "orphan.yaml",
        "place_id: city-tr-kemer\nplace_type: city\ncountry_code: TR\n",
    );
    assert_eq!(code, 1);
    assert_eq!(load_store(&store).unwrap().places().count(), 0);
}
