//! End-to-end tests for the screening feature pipeline.
//!
//! These cover the pipeline-level guarantees: deterministic learning runs,
//! no leakage of test rows into fitted statistics, exact artifact
//! round-trips, and train/serve parity.

use chrono::NaiveDate;
use dia_pipeline::{
    LearningPipeline, MedianImputer, ParameterStore, PipelineConfig, ScreeningRecord,
    ServingPipeline,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn config_in(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig::builder()
        .artifacts_dir(dir)
        .build()
        .expect("valid config")
}

/// A deterministic labelled population with sentinels sprinkled in:
/// every fifth glucose reading is the zero sentinel, every seventh insulin
/// reading is absent entirely.
fn screening_records(n: usize) -> Vec<ScreeningRecord> {
    (0..n)
        .map(|i| {
            let birth_year = 1960 + (i as i32 % 40);
            ScreeningRecord {
                patient_id: i as i64 + 1,
                observation_id: 100 + i as i64,
                birthday_date: NaiveDate::from_ymd_opt(birth_year, 3, 15).unwrap(),
                observation_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                pregnancies: Some((i % 4) as f64),
                glucose: if i % 5 == 0 {
                    Some(0.0)
                } else {
                    Some(80.0 + (i as f64) * 3.0)
                },
                blood_pressure: Some(60.0 + (i % 13) as f64),
                skin_thickness: Some(15.0 + (i % 9) as f64),
                insulin: if i % 7 == 0 {
                    None
                } else {
                    Some(70.0 + (i % 11) as f64 * 4.0)
                },
                bmi: Some(22.0 + (i % 10) as f64 * 0.7),
                diabetes_pedigree_function: Some(0.2 + (i % 6) as f64 * 0.11),
                diagnosis: Some(i % 3 == 0),
            }
        })
        .collect()
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_learning_runs_are_deterministic() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let records = screening_records(30);

    let out_a = LearningPipeline::new(config_in(dir_a.path()))
        .unwrap()
        .run(records.clone())
        .unwrap();
    let out_b = LearningPipeline::new(config_in(dir_b.path()))
        .unwrap()
        .run(records)
        .unwrap();

    assert_eq!(out_a.train_indices, out_b.train_indices);
    assert_eq!(out_a.test_indices, out_b.test_indices);
    assert_eq!(out_a.parameters, out_b.parameters);
    assert_eq!(out_a.train_target, out_b.train_target);
    assert!(out_a.train_features.equals_missing(&out_b.train_features));
    assert!(out_a.test_features.equals_missing(&out_b.test_features));
}

#[test]
fn test_output_columns_follow_the_documented_order() {
    let dir = tempfile::tempdir().unwrap();
    let out = LearningPipeline::new(config_in(dir.path()))
        .unwrap()
        .run(screening_records(20))
        .unwrap();

    let names: Vec<String> = out
        .train_features
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "pregnancies",
            "glucose",
            "blood_pressure",
            "skin_thickness",
            "insulin",
            "bmi",
            "diabetes_pedigree_function",
            "age",
        ]
    );

    // Targets align with the partition sizes.
    assert_eq!(out.train_target.len(), out.train_features.height());
    assert_eq!(out.test_target.len(), out.test_features.height());
}

// ============================================================================
// No leakage
// ============================================================================

#[test]
fn test_fitted_statistics_ignore_test_partition_rows() {
    let dir_a = tempfile::tempdir().unwrap();
    let records = screening_records(30);

    let baseline = LearningPipeline::new(config_in(dir_a.path()))
        .unwrap()
        .run(records.clone())
        .unwrap();

    // Corrupt every row that landed in the test partition. The split is a
    // function of (row count, ratio, seed) alone, so the partitions are
    // unchanged — and fitted statistics must be too.
    let mut tampered = records;
    for &i in &baseline.test_indices {
        let r = &mut tampered[i as usize];
        r.glucose = Some(9_999.0);
        r.bmi = Some(999.0);
        r.insulin = None;
    }

    let dir_b = tempfile::tempdir().unwrap();
    let tampered_run = LearningPipeline::new(config_in(dir_b.path()))
        .unwrap()
        .run(tampered)
        .unwrap();

    assert_eq!(tampered_run.test_indices, baseline.test_indices);
    assert_eq!(tampered_run.parameters, baseline.parameters);
    assert!(tampered_run.train_features.equals_missing(&baseline.train_features));
}

#[test]
fn test_fitted_medians_match_an_independent_fit_on_the_train_rows() {
    let dir = tempfile::tempdir().unwrap();
    let records = screening_records(30);
    let out = LearningPipeline::new(config_in(dir.path()))
        .unwrap()
        .run(records.clone())
        .unwrap();

    let train_records: Vec<ScreeningRecord> = out
        .train_indices
        .iter()
        .map(|&i| records[i as usize].clone())
        .collect();
    let train_frame = dia_pipeline::dataset::feature_frame(&train_records).unwrap();

    let schema = dia_pipeline::FeatureSchema::screening();
    let imputer = MedianImputer::from_schema(&schema, &["pregnancies".to_string()]);
    let independent = imputer.fit(&train_frame).unwrap();

    assert_eq!(independent, out.parameters.medians);
}

// ============================================================================
// Round-trip and serving parity
// ============================================================================

#[test]
fn test_persisted_parameters_reload_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let out = LearningPipeline::new(config.clone())
        .unwrap()
        .run(screening_records(30))
        .unwrap();

    let reloaded = ParameterStore::from_config(&config).load().unwrap();
    assert_eq!(reloaded, out.parameters);
}

#[test]
fn test_serving_reproduces_the_learning_apply_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let records = screening_records(30);

    let out = LearningPipeline::new(config.clone())
        .unwrap()
        .run(records.clone())
        .unwrap();

    // Feed the serving pipeline exactly the rows that formed the test
    // partition, unlabelled, in partition order.
    let batch: Vec<ScreeningRecord> = out
        .test_indices
        .iter()
        .map(|&i| {
            let mut r = records[i as usize].clone();
            r.diagnosis = None;
            r
        })
        .collect();

    let serving = ServingPipeline::load(&config).unwrap();
    let features = serving.transform(&batch).unwrap();

    assert!(features.equals_missing(&out.test_features));
}

#[test]
fn test_one_serving_instance_handles_repeated_batches() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    LearningPipeline::new(config.clone())
        .unwrap()
        .run(screening_records(30))
        .unwrap();

    let serving = ServingPipeline::load(&config).unwrap();
    let batch = screening_records(5);

    let first = serving.transform(&batch).unwrap();
    let second = serving.transform(&batch).unwrap();
    assert!(first.equals_missing(&second));
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_serving_without_artifacts_is_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServingPipeline::load(&config_in(dir.path())).unwrap_err();
    assert_eq!(err.code(), "UNINITIALIZED_MODEL");
}

#[test]
fn test_learning_rejects_an_unlabelled_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = screening_records(10);
    for r in &mut records {
        r.diagnosis = None;
    }

    let err = LearningPipeline::new(config_in(dir.path()))
        .unwrap()
        .run(records)
        .unwrap_err();
    assert_eq!(err.code(), "NO_DATA_LOADED");
}

#[test]
fn test_degenerate_train_column_aborts_the_fit() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = screening_records(20);
    for r in &mut records {
        r.bmi = Some(25.0);
    }

    let err = LearningPipeline::new(config_in(dir.path()))
        .unwrap()
        .run(records)
        .unwrap_err();
    assert_eq!(err.code(), "DEGENERATE_COLUMN");

    // An aborted fit persists nothing.
    let serving = ServingPipeline::load(&config_in(dir.path()));
    assert!(serving.is_err());
}

#[test]
fn test_bad_date_aborts_with_row_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = screening_records(10);
    records[3].observation_date = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();

    let err = LearningPipeline::new(config_in(dir.path()))
        .unwrap()
        .run(records)
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_DATE_RANGE");
    assert!(err.to_string().contains("103"));
}
