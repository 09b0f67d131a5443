//! Pipeline orchestrators.
//!
//! Both variants run the same linear transformation — derive age, project
//! to the schema, impute, scale — and differ only in where the fitted
//! statistics come from. That provenance is the [`StatisticsProvider`]
//! strategy: Learning fits on the train partition and persists, Serving
//! reuses what was persisted and never fits.

mod learning;
mod serving;

pub use learning::{LearningOutput, LearningPipeline};
pub use serving::ServingPipeline;

use crate::error::Result;
use crate::impute::MedianImputer;
use crate::scale::StandardScaler;
use crate::store::ParameterStore;
use crate::types::FittedParameters;
use polars::prelude::*;

/// Source of the statistics a transformation runs with.
pub trait StatisticsProvider {
    /// Produce the fitted parameters for one run. `fit_frame` is the
    /// partition statistics may be computed from; a loading provider
    /// ignores it.
    fn provide(&self, fit_frame: &DataFrame) -> Result<FittedParameters>;
}

/// Compute statistics from the given partition and persist them.
///
/// Medians are fitted on the raw partition; scale parameters on the
/// imputed partition, matching the order the transformation itself runs
/// in.
pub struct FitAndPersist<'a> {
    pub imputer: &'a MedianImputer,
    pub scaler: &'a StandardScaler,
    pub store: &'a ParameterStore,
}

impl StatisticsProvider for FitAndPersist<'_> {
    fn provide(&self, fit_frame: &DataFrame) -> Result<FittedParameters> {
        let medians = self.imputer.fit(fit_frame)?;
        let imputed = self.imputer.transform(fit_frame.clone(), &medians)?;
        let scales = self.scaler.fit(&imputed)?;
        let params = FittedParameters { medians, scales };
        self.store.save(&params)?;
        Ok(params)
    }
}

/// Hand out previously persisted statistics; never fits.
#[derive(Debug)]
pub struct LoadPersisted {
    params: FittedParameters,
}

impl LoadPersisted {
    /// Load both artifacts eagerly so a missing fit surfaces at
    /// construction, not mid-batch.
    pub fn from_store(store: &ParameterStore) -> Result<Self> {
        Ok(Self {
            params: store.load()?,
        })
    }

    pub fn parameters(&self) -> &FittedParameters {
        &self.params
    }
}

impl StatisticsProvider for LoadPersisted {
    fn provide(&self, _fit_frame: &DataFrame) -> Result<FittedParameters> {
        Ok(self.params.clone())
    }
}

/// The shared apply path: impute with the fitted medians, then scale with
/// the fitted parameters. Every partition and every serving batch goes
/// through this one function.
pub(crate) fn apply_parameters(
    df: DataFrame,
    imputer: &MedianImputer,
    scaler: &StandardScaler,
    params: &FittedParameters,
) -> Result<DataFrame> {
    let imputed = imputer.transform(df, &params.medians)?;
    scaler.transform(imputed, &params.scales)
}
