//! Learning-mode orchestrator.

use crate::config::PipelineConfig;
use crate::dataset::{feature_frame, split_labelled};
use crate::error::{PipelineError, Result};
use crate::impute::MedianImputer;
use crate::pipeline::{apply_parameters, FitAndPersist, StatisticsProvider};
use crate::scale::StandardScaler;
use crate::schema::{project_features, FeatureSchema};
use crate::source::ScreeningRecord;
use crate::split::{take_rows, take_target, train_test_indices};
use crate::store::ParameterStore;
use crate::types::FittedParameters;
use polars::prelude::*;
use tracing::{info, warn};

/// Everything one training run produces: the transformed partitions, the
/// aligned targets, the split indices, and the statistics that were fitted
/// (and persisted) along the way.
#[derive(Debug, Clone)]
pub struct LearningOutput {
    pub train_features: DataFrame,
    pub test_features: DataFrame,
    pub train_target: Vec<bool>,
    pub test_target: Vec<bool>,
    pub train_indices: Vec<u32>,
    pub test_indices: Vec<u32>,
    pub parameters: FittedParameters,
}

/// The fit-mode pipeline: split first, fit on the train partition only,
/// apply the same fitted statistics to the test partition, persist.
///
/// Fitting before splitting would leak test information into the training
/// statistics; the step order here is the pipeline's core correctness
/// invariant.
pub struct LearningPipeline {
    config: PipelineConfig,
    schema: FeatureSchema,
    imputer: MedianImputer,
    scaler: StandardScaler,
    store: ParameterStore,
}

impl LearningPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let schema = FeatureSchema::screening();
        let imputer = MedianImputer::from_schema(&schema, &config.impute_exclusions);
        let scaler = StandardScaler::from_schema(&schema);
        let store = ParameterStore::from_config(&config);
        Ok(Self {
            config,
            schema,
            imputer,
            scaler,
            store,
        })
    }

    /// Run one full fit over a raw batch.
    ///
    /// Any step failure aborts the whole batch; nothing is persisted or
    /// returned partially.
    pub fn run(&self, records: Vec<ScreeningRecord>) -> Result<LearningOutput> {
        info!(rows = records.len(), "learning pipeline: loaded raw batch");

        let (labelled, target, dropped) = split_labelled(records);
        if dropped > 0 {
            warn!(dropped, "ignoring rows without a final diagnosis");
        }
        if labelled.is_empty() {
            return Err(PipelineError::NoDataLoaded);
        }

        let frame = feature_frame(&labelled)?;
        info!(rows = frame.height(), "derived ages");

        let features = project_features(&frame, &self.schema)?;

        let (train_indices, test_indices) = train_test_indices(
            features.height(),
            self.config.test_size,
            self.config.random_seed,
        );
        info!(
            train = train_indices.len(),
            test = test_indices.len(),
            seed = self.config.random_seed,
            "split partitions"
        );

        let train_raw = take_rows(&features, &train_indices)?;
        let test_raw = take_rows(&features, &test_indices)?;
        let train_target = take_target(&target, &train_indices);
        let test_target = take_target(&target, &test_indices);

        // Statistics come from the train partition alone.
        let provider = FitAndPersist {
            imputer: &self.imputer,
            scaler: &self.scaler,
            store: &self.store,
        };
        let parameters = provider.provide(&train_raw)?;

        let train_features = apply_parameters(train_raw, &self.imputer, &self.scaler, &parameters)?;
        let test_features = apply_parameters(test_raw, &self.imputer, &self.scaler, &parameters)?;
        info!("imputed and scaled both partitions");

        Ok(LearningOutput {
            train_features,
            test_features,
            train_target,
            test_target,
            train_indices,
            test_indices,
            parameters,
        })
    }
}
