mod common;

use common::{assert_status_invariants, column, read_csv, TestEnv};
use fieldscan::{process_category, process_geodatabases, Category, InventoryConfig};
use std::fs;

#[test]
fn broken_geodatabase_still_gets_a_row() {
    let env = TestEnv::new();
    env.mkdir("Cetaceans_Study/sightings.gdb");
    env.write("Cetaceans_Study/sightings.gdb/garbage.bin", b"\0\0\0");

    let output = env.out().join("metadata_gdb_layer_metadata.csv");
    let report = process_geodatabases(&[env.root()], &output, &InventoryConfig::default()).unwrap();
    assert_eq!(report.items, 1);
    assert_eq!(report.success, 0);

    let (headers, rows) = read_csv(&output);
    assert_eq!(rows.len(), 1);
    assert_status_invariants(&headers, &rows);
    assert_eq!(rows[0][column(&headers, "gdb_name")], "Cetaceans_Study");
    assert_eq!(rows[0][column(&headers, "layer")], "");
}

#[test]
fn empty_roots_write_empty_outputs() {
    let env = TestEnv::new();
    env.mkdir("nothing_here");

    for category in Category::ALL {
        let report = process_category(
            category,
            &[env.root()],
            &env.out(),
            "empty",
            &InventoryConfig::default(),
        )
        .unwrap();
        assert_eq!(report.items, 0);
        assert!(report.output.ends_with(category.output_file_name("empty")));
        assert_eq!(fs::read_to_string(&report.output).unwrap(), "");
    }
}

#[test]
fn config_file_overrides_vocabulary() {
    let env = TestEnv::new();
    let config_path = env.temp.path().join("fieldscan.toml");
    fs::write(
        &config_path,
        "subject_vocabulary = [\"Mangroves\"]\nrow_cap = 5\n",
    )
    .unwrap();
    env.write("Mangroves/plots.csv", "a\n1\n");

    let config = InventoryConfig::load(&config_path).unwrap();
    assert_eq!(config.row_cap, 5);
    assert_eq!(config.target_epsg, 32636);

    let output = env.out().join("tables.csv");
    fieldscan::process_tables(&[env.root()], &output, &config).unwrap();
    let (headers, rows) = read_csv(&output);
    assert_eq!(rows[0][column(&headers, "Species")], "Mangroves");
}
