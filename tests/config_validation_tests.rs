//! Config Validation Tests
//!
//! Typo detection and range validation of drift_config.toml, exercised
//! through the public loader.

use std::fs;

use tempfile::TempDir;

use bore_drift::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use bore_drift::config::{ConfigError, DriftConfig};
use bore_drift::regression::MaxFeatures;
use bore_drift::{DriftError, StrategyKind};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_forest_section_warns_with_suggestion() {
    let warnings = validate_unknown_keys("[regression.forest]\nn_tress = 50\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "regression.forest.n_tress");
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("regression.forest.n_trees")
    );
}

#[test]
fn typo_does_not_fail_the_load() {
    let config = DriftConfig::from_toml_str(
        r#"
[trajectory]
sample_cout = 10

[severity]
high_deg = 20.0
"#,
    )
    .expect("typos only warn");
    assert_eq!(config.trajectory.sample_count, 100);
    assert_eq!(config.severity.high_deg, 20.0);
}

#[test]
fn full_config_produces_zero_warnings() {
    let toml_str = r#"
[training]
test_fraction = 0.25
seed = 7
strategy = "neural_network"

[regression.forest]
n_trees = 50
max_depth = 12
min_samples_split = 4
min_samples_leaf = 2
max_features = "sqrt"
seed = 1

[regression.svr]
c = 10.0
epsilon = 0.5
gamma = 0.1
tolerance = 1e-4
max_passes = 500

[regression.mlp]
hidden_layers = [64, 32]
learning_rate = 0.005
alpha = 1e-3
batch_size = 64
max_iter = 300
tolerance = 1e-5
n_iter_no_change = 20
seed = 9

[trajectory]
sample_count = 250

[severity]
moderate_deg = 3.0
high_deg = 10.0
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());

    let config = DriftConfig::from_toml_str(toml_str).expect("valid");
    assert_eq!(config.training.strategy, StrategyKind::NeuralNetwork);
    assert_eq!(config.regression.forest.max_depth, Some(12));
    assert_eq!(config.regression.forest.max_features, MaxFeatures::Sqrt);
    assert_eq!(config.regression.svr.gamma, Some(0.1));
    assert_eq!(config.regression.mlp.hidden_layers, [64, 32]);
    assert_eq!(config.trajectory.sample_count, 250);

    let options = config.training_options();
    assert_eq!(options.test_fraction, 0.25);
    assert_eq!(options.seed, 7);
}

#[test]
fn unknown_section_is_reported() {
    let warnings = validate_unknown_keys("[plotting]\ntheme = \"dark\"\n");
    let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
    assert_eq!(fields, vec!["plotting", "plotting.theme"]);
}

#[test]
fn suggestion_requires_a_close_match() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("training.sede", &known).as_deref(),
        Some("training.seed")
    );
    assert!(suggest_correction("completely.unrelated.key", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn out_of_range_values_are_all_reported() {
    let err = DriftConfig::from_toml_str(
        r#"
[training]
test_fraction = 0.0

[regression.svr]
c = -1.0

[severity]
moderate_deg = 15.0
high_deg = 5.0
"#,
    )
    .expect_err("invalid ranges");

    let ConfigError::Validation(errors) = &err else {
        panic!("expected Validation, got {err}");
    };
    assert_eq!(errors.len(), 3, "{errors:?}");
    let text = err.to_string();
    assert!(text.contains("  - training.test_fraction"));
    assert!(text.contains("  - regression.svr.c"));
    assert!(text.contains("  - severity.moderate_deg"));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let err = DriftConfig::from_toml_str("[trajectory]\nsample_count = \"many\"\n")
        .expect_err("bad type");
    assert!(matches!(err, ConfigError::Parse(..)));
}

#[test]
fn unknown_strategy_name_is_a_parse_error() {
    let err = DriftConfig::from_toml_str("[training]\nstrategy = \"xgboost\"\n")
        .expect_err("bad strategy");
    assert!(matches!(err, ConfigError::Parse(..)));
}

#[test]
fn config_error_converts_into_drift_error() {
    let err: DriftError = ConfigError::Validation(vec!["x".to_string()]).into();
    assert!(matches!(err, DriftError::Config(_)));
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn load_from_file_reports_path_on_parse_failure() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("drift_config.toml");
    fs::write(&path, "[training\nseed = 1\n").expect("write");

    match DriftConfig::load_from_file(&path) {
        Err(ConfigError::Parse(p, _)) => assert_eq!(p, path),
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[test]
fn saved_config_loads_back() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("drift_config.toml");

    let mut config = DriftConfig::default();
    config.training.strategy = StrategyKind::Linear;
    config.trajectory.sample_count = 42;
    fs::write(&path, config.to_toml().expect("serialize")).expect("write");

    assert_eq!(DriftConfig::load_from_file(&path).expect("load"), config);
}
