//! Serving-mode orchestrator.

use crate::config::PipelineConfig;
use crate::dataset::feature_frame;
use crate::error::Result;
use crate::impute::MedianImputer;
use crate::pipeline::{apply_parameters, LoadPersisted, StatisticsProvider};
use crate::scale::StandardScaler;
use crate::schema::{project_features, FeatureSchema};
use crate::source::ScreeningRecord;
use crate::store::ParameterStore;
use crate::types::FittedParameters;
use polars::prelude::*;
use tracing::info;

/// The apply-mode pipeline: transform incoming batches with the statistics
/// persisted by a Learning run.
///
/// Construction loads both artifacts and fails with `UninitializedModel`
/// when either is absent — this variant never falls back to fitting fresh
/// statistics, which would reintroduce train/serve skew. Once built, the
/// loaded parameters are immutable shared state: one instance may be
/// reused across many concurrent serving calls without locking.
#[derive(Debug)]
pub struct ServingPipeline {
    schema: FeatureSchema,
    imputer: MedianImputer,
    scaler: StandardScaler,
    provider: LoadPersisted,
}

// One loaded instance is shared across serving calls.
static_assertions::assert_impl_all!(ServingPipeline: Send, Sync);

impl ServingPipeline {
    /// Build the pipeline from previously persisted artifacts.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let store = ParameterStore::from_config(config);
        let provider = LoadPersisted::from_store(&store)?;
        let schema = FeatureSchema::screening();
        let imputer = MedianImputer::from_schema(&schema, &config.impute_exclusions);
        let scaler = StandardScaler::from_schema(&schema);
        info!(
            medians = %store.medians_path().display(),
            scaler = %store.scaler_path().display(),
            "serving pipeline loaded fitted parameters"
        );
        Ok(Self {
            schema,
            imputer,
            scaler,
            provider,
        })
    }

    /// The statistics this pipeline transforms with.
    pub fn parameters(&self) -> &FittedParameters {
        self.provider.parameters()
    }

    /// Transform one incoming batch into a feature matrix.
    ///
    /// No target is produced — the diagnosis is unknown at serving time.
    /// A failing step aborts the batch atomically.
    pub fn transform(&self, records: &[ScreeningRecord]) -> Result<DataFrame> {
        let frame = feature_frame(records)?;
        let features = project_features(&frame, &self.schema)?;
        let params = self.provider.provide(&features)?;
        apply_parameters(features, &self.imputer, &self.scaler, &params)
    }
}
