//! Persistence of fitted parameters.
//!
//! The store owns the two persisted artifacts — the imputation median
//! mapping and the scale parameters — and guarantees exact round-trip
//! fidelity: reloading yields statistics identical to the ones written.
//! Artifacts are written wholesale at Learning time and are read-only
//! afterwards.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::schema::FeatureSchema;
use crate::types::{FittedParameters, ImputationMedians, ScaleParameters};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File-backed store for the two fitted-parameter artifacts.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    medians_path: PathBuf,
    scaler_path: PathBuf,
}

impl ParameterStore {
    pub fn new(medians_path: impl Into<PathBuf>, scaler_path: impl Into<PathBuf>) -> Self {
        Self {
            medians_path: medians_path.into(),
            scaler_path: scaler_path.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.medians_path, &config.scaler_path)
    }

    pub fn medians_path(&self) -> &Path {
        &self.medians_path
    }

    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    /// Persist both artifacts, replacing any previous fit wholesale.
    ///
    /// The naming contract (`.json` extension, non-empty stem) is enforced
    /// here, at write time.
    pub fn save(&self, params: &FittedParameters) -> Result<()> {
        write_json(&self.medians_path, &params.medians)?;
        write_json(&self.scaler_path, &params.scales)?;
        info!(
            medians = %self.medians_path.display(),
            scaler = %self.scaler_path.display(),
            "persisted fitted parameters"
        );
        Ok(())
    }

    /// Reload both artifacts.
    ///
    /// A missing artifact fails with `UninitializedModel`; an artifact
    /// fitted under a different feature-schema version fails with
    /// `SchemaMismatch`.
    pub fn load(&self) -> Result<FittedParameters> {
        let medians: ImputationMedians = read_json(&self.medians_path)?;
        let scales: ScaleParameters = read_json(&self.scaler_path)?;

        check_schema_version("medians", medians.schema_version)?;
        check_schema_version("scaler", scales.schema_version)?;

        Ok(FittedParameters { medians, scales })
    }
}

fn check_schema_version(artifact: &str, found: u32) -> Result<()> {
    if found != FeatureSchema::VERSION {
        return Err(PipelineError::SchemaMismatch(format!(
            "{artifact} artifact was fitted under schema version {found}, current is {}",
            FeatureSchema::VERSION
        )));
    }
    Ok(())
}

fn validate_artifact_path(path: &Path) -> Result<()> {
    let extension_ok = path.extension().and_then(|e| e.to_str()) == Some("json");
    if !extension_ok {
        return Err(PipelineError::InvalidArtifactPath {
            path: path.to_path_buf(),
            reason: "expected a .json extension".to_string(),
        });
    }
    let stem_ok = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| !s.is_empty());
    if !stem_ok {
        return Err(PipelineError::InvalidArtifactPath {
            path: path.to_path_buf(),
            reason: "artifact file name must have a non-empty stem".to_string(),
        });
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    validate_artifact_path(path)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(PipelineError::UninitializedModel(format!(
            "missing artifact {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn sample_params() -> FittedParameters {
        let mut medians = BTreeMap::new();
        // Values chosen so a binary-imprecise serializer would betray itself.
        medians.insert("glucose".to_string(), 117.5);
        medians.insert("bmi".to_string(), 0.1 + 0.2);

        let mut columns = BTreeMap::new();
        columns.insert(
            "glucose".to_string(),
            crate::types::ColumnScale {
                mean: 121.686_763_485_477_18,
                std_dev: 30.535_641,
            },
        );

        FittedParameters {
            medians: ImputationMedians {
                schema_version: FeatureSchema::VERSION,
                medians,
            },
            scales: ScaleParameters {
                schema_version: FeatureSchema::VERSION,
                columns,
            },
        }
    }

    fn store_in(dir: &Path) -> ParameterStore {
        ParameterStore::new(dir.join("medians.json"), dir.join("scaler.json"))
    }

    #[test]
    fn test_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let params = sample_params();

        store.save(&params).unwrap();
        let loaded = store.load().unwrap();

        // Bit-identical statistics, not merely approximately equal.
        assert_eq!(loaded, params);
    }

    #[test]
    fn test_missing_artifact_is_uninitialized_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let err = store.load().unwrap_err();
        assert_eq!(err.code(), "UNINITIALIZED_MODEL");
    }

    #[test]
    fn test_one_missing_artifact_is_enough_to_fail() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&sample_params()).unwrap();
        fs::remove_file(store.scaler_path()).unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.code(), "UNINITIALIZED_MODEL");
    }

    #[test]
    fn test_wrong_extension_violates_naming_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::new(dir.path().join("medians.bin"), dir.path().join("scaler.json"));

        let err = store.save(&sample_params()).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARTIFACT_PATH");
    }

    #[test]
    fn test_stale_schema_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut params = sample_params();
        params.medians.schema_version = FeatureSchema::VERSION + 1;
        store.save(&params).unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.code(), "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut params = sample_params();
        store.save(&params).unwrap();

        params.medians.medians.insert("glucose".to_string(), 99.0);
        store.save(&params).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.medians.get("glucose"), Some(99.0));
    }
}
