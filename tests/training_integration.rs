//! Training Integration Tests
//!
//! Demo data → dual-target trainer → model pair → trajectory, for every
//! regression strategy.

use bore_drift::dataset::{generate, DemoOptions};
use bore_drift::regression::{MlpConfig, RegressionConfig};
use bore_drift::{
    reconstruct, DriftError, DrillingRecord, DualTargetTrainer, StrategyKind, TrainingCheckpoint,
    TrainingOptions,
};

fn demo(rows: usize) -> Vec<DrillingRecord> {
    generate(DemoOptions { rows, seed: 42 }).expect("demo data")
}

/// Default hyperparameters with a small network and forest.
fn quick_config() -> RegressionConfig {
    let mut config = RegressionConfig::default();
    config.forest.n_trees = 30;
    config.mlp = MlpConfig {
        hidden_layers: [16, 8],
        learning_rate: 0.01,
        batch_size: 32,
        max_iter: 200,
        ..MlpConfig::default()
    };
    config
}

fn trainer() -> DualTargetTrainer {
    DualTargetTrainer::new(quick_config(), TrainingOptions::default())
}

// ============================================================================
// End-to-End
// ============================================================================

#[test]
fn every_strategy_trains_and_predicts() {
    let records = demo(250);
    let planned = DrillingRecord::new(600.0, 120.0, -55.0, "Granite", 110.0);

    for kind in StrategyKind::ALL {
        let (pair, metrics) = trainer()
            .train(&records, kind)
            .unwrap_or_else(|e| panic!("{kind} failed: {e}"));

        assert_eq!(pair.strategy(), kind);
        assert_eq!(metrics.strategy, kind);
        assert_eq!(metrics.test_rows, 50);
        assert_eq!(metrics.train_rows, 200);
        assert_eq!(metrics.azimuth.test_pairs.len(), 50);
        assert!(metrics.azimuth.rmse.is_finite() && metrics.inclination.rmse.is_finite());
        assert_eq!(
            metrics.azimuth.feature_importance.is_some(),
            kind.supports_feature_importance()
        );

        let predicted = pair.predict(&planned).expect("predict");
        assert!(predicted.azimuth.is_finite() && predicted.inclination.is_finite());

        let trajectory = reconstruct(
            planned.azimuth_initial,
            planned.inclination_initial,
            planned.depth_final,
            predicted.azimuth,
            predicted.inclination,
            50,
        )
        .expect("reconstruct");
        assert_eq!(trajectory.predicted_path.len(), 50);
    }
}

#[test]
fn linear_model_recovers_demo_structure() {
    // Demo deviations are linear in the inputs, so OLS should explain most
    // of the azimuth variance (noise sd 10 against a ~45° depth term).
    let (_, metrics) = trainer()
        .train(&demo(1000), StrategyKind::Linear)
        .expect("train");
    assert!(metrics.azimuth.r2 > 0.5, "azimuth R² {}", metrics.azimuth.r2);
}

#[test]
fn deterministic_strategies_are_reproducible() {
    let records = demo(200);
    for kind in [StrategyKind::RandomForest, StrategyKind::KernelSvr, StrategyKind::Linear] {
        let (_, a) = trainer().train(&records, kind).expect("first run");
        let (_, b) = trainer().train(&records, kind).expect("second run");
        assert!((a.azimuth.rmse - b.azimuth.rmse).abs() < 1e-9, "{kind}");
        assert!((a.inclination.r2 - b.inclination.r2).abs() < 1e-9, "{kind}");
    }
}

#[test]
fn neural_network_retrains_without_not_trained_errors() {
    let records = demo(200);
    for _ in 0..2 {
        let (pair, _) = trainer()
            .train(&records, StrategyKind::NeuralNetwork)
            .expect("train");
        assert!(pair.predict_batch(&records[..5]).is_ok());
    }
}

#[test]
fn batch_prediction_matches_single_prediction() {
    let records = demo(150);
    let (pair, _) = trainer().train(&records, StrategyKind::RandomForest).expect("train");

    let batch = pair.predict_batch(&records[..10]).expect("batch");
    for (record, expected) in records[..10].iter().zip(&batch) {
        assert_eq!(&pair.predict(record).expect("single"), expected);
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn single_rock_type_importance_is_well_defined() {
    let records: Vec<DrillingRecord> = demo(150)
        .into_iter()
        .map(|mut r| {
            r.rock_type = "Granite".to_string();
            r
        })
        .collect();

    let (_, metrics) = trainer().train(&records, StrategyKind::RandomForest).expect("train");
    let importance = metrics.azimuth.feature_importance.expect("forest importance");
    assert_eq!(importance.len(), 5);
    assert_eq!(importance[4].feature, "rock_type=Granite");
    assert!(importance.iter().all(|f| f.importance.is_finite() && f.importance >= 0.0));
    let total: f64 = importance.iter().map(|f| f.importance).sum();
    assert!((total - 1.0).abs() < 1e-9 || total == 0.0);
}

#[test]
fn unseen_rock_type_predicts_normally() {
    let (pair, _) = trainer()
        .train(&demo(150), StrategyKind::Linear)
        .expect("train");
    let record = DrillingRecord::new(400.0, 90.0, -45.0, "Kimberlite", 100.0);
    assert!(!pair.azimuth().transform().knows_rock_type("Kimberlite"));
    assert!(pair.predict(&record).is_ok());
}

#[test]
fn empty_dataset_fails_as_training_error() {
    let err = trainer()
        .train(&[], StrategyKind::Linear)
        .expect_err("no rows");
    match &err {
        DriftError::Training { stage, .. } => assert_eq!(*stage, TrainingCheckpoint::DataPrepared),
        other => panic!("expected Training, got {other:?}"),
    }
    assert!(matches!(err.root_cause(), DriftError::EmptyDataset(_)));
}

#[test]
fn progress_reaches_every_checkpoint_once() {
    let mut seen = Vec::new();
    trainer()
        .train_with_progress(&demo(100), StrategyKind::Linear, &mut |stage| {
            seen.push(stage.percent())
        })
        .expect("train");
    assert_eq!(seen, vec![20, 50, 80, 100]);
}

#[test]
fn model_pair_is_shared_across_threads() {
    let records = demo(150);
    let (pair, _) = trainer().train(&records, StrategyKind::RandomForest).expect("train");
    let pair = std::sync::Arc::new(pair);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pair = pair.clone();
            let record = records[i].clone();
            std::thread::spawn(move || pair.predict(&record).expect("predict"))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("thread").azimuth.is_finite());
    }
}
