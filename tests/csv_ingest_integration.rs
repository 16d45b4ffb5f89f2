//! CSV Ingestion Integration Tests
//!
//! Files on disk → column mapping → records → training.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use bore_drift::dataset::{
    generate, load_records, parse_override, summarize, write_csv, DemoOptions, SchemaField,
};
use bore_drift::{DriftError, DualTargetTrainer, StrategyKind};

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write csv");
    path
}

const FIELD_EXPORT: &str = "\
Hole ID,Hole Depth,Collar Azimuth,Collar Dip,Lithology,RPM,AzDev,IncDev
DH-001,420.5,45,-60,Granite,110,12.1,-3.2
DH-002,610,120,-75,\"Schist, foliated\",95,18.4,1.1
DH-003,305,270,-45,Granite,130,9.8,-0.7
DH-004,512,15,-80,Basalt,120,-,2.5
DH-005,700,300,-55,,100,22.0,4.1
";

#[test]
fn field_export_needs_label_overrides() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(&dir, "holes.csv", FIELD_EXPORT);

    let err = load_records(&path, &[], true).expect_err("labels unmapped");
    match err {
        DriftError::Schema(fields) => {
            assert_eq!(fields, vec!["deviation_azimuth", "deviation_inclination"]);
        }
        other => panic!("expected Schema, got {other:?}"),
    }

    let overrides = vec![
        parse_override("deviation_azimuth=AzDev").expect("override"),
        parse_override("deviation_inclination=incdev").expect("override"),
    ];
    let loaded = load_records(&path, &overrides, true).expect("load");

    // DH-004 has no azimuth deviation
    assert_eq!(loaded.records.len(), 4);
    assert_eq!(loaded.summary.skipped_rows, 1);
    assert_eq!(loaded.summary.error_rows, 0);
    assert!(!loaded.summary.rock_type_defaulted);

    let second = &loaded.records[1];
    assert_eq!(second.rock_type, "Schist, foliated");
    assert_eq!(second.depth_final, 610.0);
    assert_eq!(second.deviation.map(|d| d.azimuth), Some(18.4));

    // Blank lithology cell falls back to the placeholder
    assert_eq!(loaded.records[3].rock_type, "Unknown");
}

#[test]
fn inference_file_loads_without_labels() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(
        &dir,
        "planned.csv",
        "depth_final,azimuth_initial,inclination_initial,rotation_speed\n500,90,-60,120\n650,180,-70,100\n",
    );

    let loaded = load_records(&path, &[], false).expect("load");
    assert_eq!(loaded.records.len(), 2);
    assert!(loaded.records.iter().all(|r| !r.is_labelled()));
    assert!(loaded.summary.rock_type_defaulted);

    assert!(matches!(
        load_records(&path, &[], true),
        Err(DriftError::Schema(_))
    ));
}

#[test]
fn file_with_only_bad_rows_is_empty_dataset() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(
        &dir,
        "bad.csv",
        "depth_final,azimuth_initial,inclination_initial,rotation_speed\nx,y,z,w\n",
    );
    assert!(matches!(
        load_records(&path, &[], false),
        Err(DriftError::EmptyDataset(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    assert!(matches!(
        load_records(dir.path().join("absent.csv"), &[], true),
        Err(DriftError::Io(_))
    ));
}

#[test]
fn unknown_override_column_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(&dir, "holes.csv", FIELD_EXPORT);
    let overrides = vec![(SchemaField::DeviationAzimuth, "Nope".to_string())];
    assert!(matches!(
        load_records(&path, &overrides, true),
        Err(DriftError::InvalidInput(_))
    ));
}

#[test]
fn demo_csv_round_trips_through_training() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("demo.csv");
    let records = generate(DemoOptions { rows: 120, seed: 3 }).expect("demo");
    write_csv(&records, fs::File::create(&path).expect("create")).expect("write");

    let loaded = load_records(&path, &[], true).expect("load");
    assert_eq!(loaded.records.len(), 120);
    assert_eq!(loaded.summary.skipped_rows + loaded.summary.error_rows, 0);

    let summary = summarize(&loaded.records).expect("summary");
    assert_eq!(summary.labelled_rows, 120);

    let (_, metrics) = DualTargetTrainer::default()
        .train(&loaded.records, StrategyKind::Linear)
        .expect("train");
    assert_eq!(metrics.test_rows, 24);
}
