//! Sentinel-aware median imputation.
//!
//! Raw clinical measurements use zero (or an absent value) as the missing
//! sentinel, so a cell is treated as null when it is null **or exactly
//! zero**. This conflates a true biological zero with missing data for
//! every eligible column; that is the source system's documented behavior
//! and is carried over unchanged. Columns where zero is a legitimate count
//! are kept out of imputation through the exclusion set.

use crate::error::{PipelineError, Result};
use crate::schema::FeatureSchema;
use crate::types::ImputationMedians;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Two-mode median imputer over a fixed set of eligible columns.
///
/// Fit mode computes the fill values; apply mode reuses a previously
/// fitted mapping without recomputation.
#[derive(Debug, Clone)]
pub struct MedianImputer {
    eligible: Vec<String>,
}

impl MedianImputer {
    pub fn new(eligible: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            eligible: eligible.into_iter().map(Into::into).collect(),
        }
    }

    /// Eligible columns per the schema: every numeric and binary feature
    /// except the exclusions.
    pub fn from_schema(schema: &FeatureSchema, exclusions: &[String]) -> Self {
        let eligible = schema
            .numeric_names()
            .into_iter()
            .chain(schema.binary_names())
            .filter(|name| !exclusions.iter().any(|e| e == name))
            .map(str::to_string)
            .collect();
        Self { eligible }
    }

    pub fn eligible(&self) -> &[String] {
        &self.eligible
    }

    /// Fit mode: compute the median of the non-sentinel values of each
    /// eligible column.
    pub fn fit(&self, df: &DataFrame) -> Result<ImputationMedians> {
        let mut medians = BTreeMap::new();
        for name in &self.eligible {
            let values = column_values(df, name)?;
            let mut observed: Vec<f64> = values
                .into_iter()
                .filter(|v| !is_sentinel(*v))
                .flatten()
                .collect();
            if observed.is_empty() {
                return Err(PipelineError::NoValidValues(name.clone()));
            }
            observed.sort_by(f64::total_cmp);
            let median = median_of_sorted(&observed);
            debug!(column = %name, median, "fitted imputation median");
            medians.insert(name.clone(), median);
        }
        Ok(ImputationMedians {
            schema_version: FeatureSchema::VERSION,
            medians,
        })
    }

    /// Fit mode, returning the dataset with sentinels replaced by the
    /// freshly fitted medians alongside the mapping itself.
    pub fn fit_transform(&self, df: DataFrame) -> Result<(DataFrame, ImputationMedians)> {
        let medians = self.fit(&df)?;
        let filled = self.transform(df, &medians)?;
        Ok((filled, medians))
    }

    /// Apply mode: replace sentinels using a supplied mapping, without
    /// recomputing statistics.
    pub fn transform(&self, mut df: DataFrame, medians: &ImputationMedians) -> Result<DataFrame> {
        for name in &self.eligible {
            let fill = medians
                .get(name)
                .ok_or_else(|| PipelineError::MissingMedian(name.clone()))?;
            let values = column_values(&df, name)?;
            let filled: Vec<f64> = values
                .into_iter()
                .map(|v| if is_sentinel(v) { fill } else { v.unwrap_or(fill) })
                .collect();
            df.replace(name, Series::new(name.as_str().into(), filled))?;
        }
        Ok(df)
    }
}

/// The sentinel test: a cell is "missing" when it is null or exactly zero.
fn is_sentinel(value: Option<f64>) -> bool {
    match value {
        None => true,
        Some(v) => v == 0.0,
    }
}

/// Median of an already-sorted, non-empty slice.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Extract a column as `Option<f64>` cells, failing with `SchemaMismatch`
/// when the column is absent.
pub(crate) fn column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = df.column(name).map_err(|_| {
        PipelineError::SchemaMismatch(format!("column '{name}' is missing from the dataset"))
    })?;
    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}
