//! Fitted-parameter types shared by the imputer, scaler, store and
//! orchestrators.
//!
//! Both artifacts are keyed with `BTreeMap`s so their serialized form is
//! deterministic: the same fit always writes the same bytes, and a
//! write→read round-trip reproduces the statistics exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-column fill values fitted by the imputer over a training split.
///
/// Immutable once written for a model version; replaced wholesale on
/// retraining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationMedians {
    /// Feature-schema version the mapping was fitted under.
    pub schema_version: u32,
    /// Column name → fill value.
    pub medians: BTreeMap<String, f64>,
}

impl ImputationMedians {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.medians.get(column).copied()
    }
}

/// Standardization parameters for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub mean: f64,
    pub std_dev: f64,
}

/// Per-column (mean, stddev) pairs fitted by the scaler over a training
/// split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleParameters {
    /// Feature-schema version the parameters were fitted under.
    pub schema_version: u32,
    /// Column name → standardization parameters.
    pub columns: BTreeMap<String, ColumnScale>,
}

impl ScaleParameters {
    pub fn get(&self, column: &str) -> Option<ColumnScale> {
        self.columns.get(column).copied()
    }
}

/// The complete set of statistics a transformation needs: fitted at
/// Learning time, loaded read-only at Serving time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedParameters {
    pub medians: ImputationMedians,
    pub scales: ScaleParameters,
}
