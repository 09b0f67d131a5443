//! Error types for the screening feature pipeline.
//!
//! Every error is a local, non-retriable data-contract violation: the
//! pipeline aborts the current batch and surfaces the error kind together
//! with the offending column or row context. There is no partial-success
//! mode and no internal recovery.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A column referenced by the pipeline is absent at the point columns
    /// are selected, or a persisted artifact was fitted under a different
    /// schema version.
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// An observation predates the patient's birthday.
    #[error(
        "observation {observation_id}: observation date {observation} precedes birthday {birthday}"
    )]
    InvalidDateRange {
        observation_id: i64,
        birthday: NaiveDate,
        observation: NaiveDate,
    },

    /// Apply-mode imputation was given a dataset with an eligible column
    /// missing from the fitted median mapping.
    #[error("no fitted median for column '{0}'")]
    MissingMedian(String),

    /// Apply-mode scaling was given a numeric column missing from the
    /// fitted scale parameters.
    #[error("no fitted scale parameters for column '{0}'")]
    MissingScaleParam(String),

    /// A numeric column has zero variance over the fitted partition, so
    /// standardizing it would divide by zero.
    #[error("column '{0}' has zero variance over the fitted partition")]
    DegenerateColumn(String),

    /// The serving pipeline was constructed without persisted artifacts.
    #[error("serving pipeline requires persisted fitted parameters: {0}")]
    UninitializedModel(String),

    /// An artifact path violates the persistence naming contract.
    #[error("artifact path '{path}' violates the naming contract: {reason}")]
    InvalidArtifactPath { path: PathBuf, reason: String },

    /// No non-sentinel values found in a column during fitting.
    #[error("no non-sentinel values found in column '{0}'")]
    NoValidValues(String),

    /// Learning-mode ingestion produced an empty labelled dataset.
    #[error("no labelled records to fit on")]
    NoDataLoaded,

    /// A raw source cell could not be converted to its expected type.
    #[error("failed to convert column '{column}': {reason}")]
    TypeConversionFailed { column: String, reason: String },

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::MissingMedian(_) => "MISSING_MEDIAN",
            Self::MissingScaleParam(_) => "MISSING_SCALE_PARAM",
            Self::DegenerateColumn(_) => "DEGENERATE_COLUMN",
            Self::UninitializedModel(_) => "UNINITIALIZED_MODEL",
            Self::InvalidArtifactPath { .. } => "INVALID_ARTIFACT_PATH",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PipelineError::MissingMedian("glucose".to_string()).code(),
            "MISSING_MEDIAN"
        );
        assert_eq!(PipelineError::NoDataLoaded.code(), "NO_DATA_LOADED");
    }

    #[test]
    fn test_date_range_message_carries_context() {
        let err = PipelineError::InvalidDateRange {
            observation_id: 17,
            birthday: NaiveDate::from_ymd_opt(2001, 3, 4).unwrap(),
            observation: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("17"));
        assert!(msg.contains("2001-03-04"));
        assert!(msg.contains("2000-01-01"));
    }
}
