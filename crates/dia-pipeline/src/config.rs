//! Configuration for the screening feature pipeline.
//!
//! Everything the pipeline needs is passed in explicitly through this
//! struct at construction time; nothing is read from ambient process
//! state.

use crate::error::{PipelineError, Result};
use crate::schema::columns;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default test partition share of the labelled dataset.
pub const DEFAULT_TEST_SIZE: f64 = 0.3;

/// Default split seed; fixed so repeated fits over the same data reproduce
/// the same partitions and statistics.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Configuration for both pipeline variants.
///
/// Use [`PipelineConfig::builder()`] for fluent construction with
/// validation.
///
/// # Example
///
/// ```rust,ignore
/// use dia_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .test_size(0.25)
///     .random_seed(7)
///     .artifacts_dir("models/current")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Share of labelled rows carved off as the test partition (0.0 - 1.0,
    /// exclusive). Default: 0.3.
    pub test_size: f64,

    /// Seed for the train/test shuffle. Default: 42.
    pub random_seed: u64,

    /// Columns excluded from null imputation because zero is a legitimate
    /// value there, not a missing-data sentinel. Default: pregnancies.
    pub impute_exclusions: Vec<String>,

    /// Where the fitted median mapping is persisted.
    /// Default: `artifacts/medians.json`.
    pub medians_path: PathBuf,

    /// Where the fitted scale parameters are persisted.
    /// Default: `artifacts/scaler.json`.
    pub scaler_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            random_seed: DEFAULT_RANDOM_SEED,
            impute_exclusions: vec![columns::PREGNANCIES.to_string()],
            medians_path: PathBuf::from("artifacts/medians.json"),
            scaler_path: PathBuf::from("artifacts/scaler.json"),
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "test_size {} is outside the open interval (0.0, 1.0)",
                self.test_size
            )));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    test_size: Option<f64>,
    random_seed: Option<u64>,
    impute_exclusions: Option<Vec<String>>,
    artifacts_dir: Option<PathBuf>,
    medians_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    /// Set the test partition share (0.0 - 1.0, exclusive).
    pub fn test_size(mut self, test_size: f64) -> Self {
        self.test_size = Some(test_size);
        self
    }

    /// Set the split seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Replace the imputation exclusion set.
    pub fn impute_exclusions(
        mut self,
        exclusions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.impute_exclusions = Some(exclusions.into_iter().map(Into::into).collect());
        self
    }

    /// Place both artifacts under one directory with their default names.
    ///
    /// Explicit [`medians_path`](Self::medians_path) /
    /// [`scaler_path`](Self::scaler_path) settings win over this.
    pub fn artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Set the medians artifact location.
    pub fn medians_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.medians_path = Some(path.into());
        self
    }

    /// Set the scaler artifact location.
    pub fn scaler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scaler_path = Some(path.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PipelineConfig> {
        let dir = self.artifacts_dir.unwrap_or_else(|| PathBuf::from("artifacts"));
        let config = PipelineConfig {
            test_size: self.test_size.unwrap_or(DEFAULT_TEST_SIZE),
            random_seed: self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED),
            impute_exclusions: self
                .impute_exclusions
                .unwrap_or_else(|| vec![columns::PREGNANCIES.to_string()]),
            medians_path: self.medians_path.unwrap_or_else(|| dir.join("medians.json")),
            scaler_path: self.scaler_path.unwrap_or_else(|| dir.join("scaler.json")),
        };
        config.validate()?;
        Ok(config)
    }
}
