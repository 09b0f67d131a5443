//! Record acquisition boundary.
//!
//! The persistence collaborator supplies joined
//! Patient/Observation/ObservationData/FinalReport rows, one per
//! observation. Acquisition is the pipeline's only asynchronous boundary
//! and must complete in full before any transformation step runs — the
//! pipeline never observes partial data.

use crate::error::{PipelineError, Result};
use crate::schema::columns;
use chrono::NaiveDate;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// One raw observation row, validated against the source column set at
/// construction rather than on every field access.
///
/// Dates are always present; clinical measurements may be missing, with
/// `None` and `Some(0.0)` equally meaning "sentinel" downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningRecord {
    pub patient_id: i64,
    pub observation_id: i64,
    pub birthday_date: NaiveDate,
    pub observation_date: NaiveDate,
    pub pregnancies: Option<f64>,
    pub glucose: Option<f64>,
    pub blood_pressure: Option<f64>,
    pub skin_thickness: Option<f64>,
    pub insulin: Option<f64>,
    pub bmi: Option<f64>,
    pub diabetes_pedigree_function: Option<f64>,
    /// Final-report diagnosis; `None` outside Learning-mode ingestion.
    pub diagnosis: Option<bool>,
}

/// Supplier of screening rows.
///
/// Implementations may fetch concurrently with other work, but a batch is
/// handed to the pipeline only once the fetch has fully completed.
pub trait ObservationSource {
    /// Fetch all screening rows this source can see.
    fn fetch(&self) -> impl Future<Output = Result<Vec<ScreeningRecord>>> + Send;
}

/// Reads a joined screening export from a CSV file.
///
/// Stands in for the SQL collaborator in the CLI and in tests; the column
/// names match the raw source names of the feature schema.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ObservationSource for CsvSource {
    async fn fetch(&self) -> Result<Vec<ScreeningRecord>> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(self.path.clone()))?
            .finish()?;
        info!(path = %self.path.display(), rows = df.height(), "loaded screening export");
        records_from_frame(&df)
    }
}

/// Convert a raw joined frame into typed records.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<ScreeningRecord>> {
    let patient_ids = id_column(df, columns::PATIENT_ID)?;
    let observation_ids = id_column(df, columns::OBSERVATION_ID)?;
    let birthdays = date_column(df, columns::BIRTHDAY_DATE)?;
    let observed = date_column(df, columns::OBSERVATION_DATE)?;
    let pregnancies = crate::impute::column_values(df, columns::PREGNANCIES)?;
    let glucose = crate::impute::column_values(df, columns::GLUCOSE)?;
    let blood_pressure = crate::impute::column_values(df, columns::BLOOD_PRESSURE)?;
    let skin_thickness = crate::impute::column_values(df, columns::SKIN_THICKNESS)?;
    let insulin = crate::impute::column_values(df, columns::INSULIN)?;
    let bmi = crate::impute::column_values(df, columns::BMI)?;
    let pedigree = crate::impute::column_values(df, columns::DIABETES_PEDIGREE_FUNCTION)?;
    let diagnosis = diagnosis_column(df)?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        records.push(ScreeningRecord {
            patient_id: patient_ids[row],
            observation_id: observation_ids[row],
            birthday_date: birthdays[row],
            observation_date: observed[row],
            pregnancies: pregnancies[row],
            glucose: glucose[row],
            blood_pressure: blood_pressure[row],
            skin_thickness: skin_thickness[row],
            insulin: insulin[row],
            bmi: bmi[row],
            diabetes_pedigree_function: pedigree[row],
            diagnosis: diagnosis[row],
        });
    }
    Ok(records)
}

fn id_column(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let col = df.column(name).map_err(|_| {
        PipelineError::SchemaMismatch(format!("column '{name}' is missing from the dataset"))
    })?;
    let series = col.as_materialized_series().cast(&DataType::Int64)?;
    series
        .i64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| PipelineError::TypeConversionFailed {
                column: name.to_string(),
                reason: "identifier cell is null".to_string(),
            })
        })
        .collect()
}

fn date_column(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let col = df.column(name).map_err(|_| {
        PipelineError::SchemaMismatch(format!("column '{name}' is missing from the dataset"))
    })?;
    let series = col.as_materialized_series().cast(&DataType::String)?;
    series
        .str()?
        .into_iter()
        .map(|cell| {
            let raw = cell.ok_or_else(|| PipelineError::TypeConversionFailed {
                column: name.to_string(),
                reason: "date cell is null".to_string(),
            })?;
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                PipelineError::TypeConversionFailed {
                    column: name.to_string(),
                    reason: format!("'{raw}' is not a date: {e}"),
                }
            })
        })
        .collect()
}

fn diagnosis_column(df: &DataFrame) -> Result<Vec<Option<bool>>> {
    match df.column(columns::DIAGNOSIS) {
        Ok(col) => {
            let series = col.as_materialized_series().cast(&DataType::Boolean)?;
            Ok(series.bool()?.into_iter().collect())
        }
        // A serving-time export carries no label column at all.
        Err(_) => Ok(vec![None; df.height()]),
    }
}
