//! Standardization of numeric feature columns.
//!
//! Fit mode computes per-column (mean, stddev) over the given partition;
//! apply mode standardizes with previously fitted parameters. Binary
//! columns are never scaled.

use crate::error::{PipelineError, Result};
use crate::impute::column_values;
use crate::schema::FeatureSchema;
use crate::types::{ColumnScale, ScaleParameters};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Two-mode standard scaler over a fixed set of numeric columns.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    columns: Vec<String>,
}

impl StandardScaler {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Scaled columns per the schema: numeric features only.
    pub fn from_schema(schema: &FeatureSchema) -> Self {
        Self {
            columns: schema.numeric_names().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fit mode: compute mean and population standard deviation per column.
    ///
    /// A zero fitted standard deviation means standardization would divide
    /// by zero; that surfaces as `DegenerateColumn` instead of emitting
    /// inf/NaN downstream.
    pub fn fit(&self, df: &DataFrame) -> Result<ScaleParameters> {
        let mut columns = BTreeMap::new();
        for name in &self.columns {
            let values: Vec<f64> = column_values(df, name)?
                .into_iter()
                .flatten()
                .collect();
            if values.is_empty() {
                return Err(PipelineError::NoValidValues(name.clone()));
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            if std_dev == 0.0 {
                return Err(PipelineError::DegenerateColumn(name.clone()));
            }
            debug!(column = %name, mean, std_dev, "fitted scale parameters");
            columns.insert(name.clone(), ColumnScale { mean, std_dev });
        }
        Ok(ScaleParameters {
            schema_version: FeatureSchema::VERSION,
            columns,
        })
    }

    /// Fit mode, returning the standardized dataset alongside the fitted
    /// parameters.
    pub fn fit_transform(&self, df: DataFrame) -> Result<(DataFrame, ScaleParameters)> {
        let params = self.fit(&df)?;
        let scaled = self.transform(df, &params)?;
        Ok((scaled, params))
    }

    /// Apply mode: standardize `(x - mean) / std_dev` with supplied
    /// parameters, without recomputation.
    pub fn transform(&self, mut df: DataFrame, params: &ScaleParameters) -> Result<DataFrame> {
        for name in &self.columns {
            let scale = params
                .get(name)
                .ok_or_else(|| PipelineError::MissingScaleParam(name.clone()))?;
            if scale.std_dev == 0.0 {
                return Err(PipelineError::DegenerateColumn(name.clone()));
            }
            let values = column_values(&df, name)?;
            let scaled: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|x| (x - scale.mean) / scale.std_dev))
                .collect();
            df.replace(name, Series::new(name.as_str().into(), scaled))?;
        }
        Ok(df)
    }
}
