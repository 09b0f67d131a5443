//! The feature schema: the closed, versioned catalog of columns the
//! pipeline produces and consumes.
//!
//! The ordered set of non-target descriptors defines the feature vector's
//! shape. Any change to that set is a contract change: bump [`FeatureSchema::VERSION`]
//! and refit, because previously persisted parameters no longer apply.

use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Raw source column names, as delivered by the persistence collaborator's
/// joined Patient/Observation/ObservationData/FinalReport rows.
pub mod columns {
    pub const PATIENT_ID: &str = "patient_id";
    pub const OBSERVATION_ID: &str = "observation_id";
    pub const BIRTHDAY_DATE: &str = "birthday_date";
    pub const OBSERVATION_DATE: &str = "observation_date";
    pub const PREGNANCIES: &str = "pregnancies";
    pub const GLUCOSE: &str = "glucose";
    pub const BLOOD_PRESSURE: &str = "blood_pressure";
    pub const SKIN_THICKNESS: &str = "skin_thickness";
    pub const INSULIN: &str = "insulin";
    pub const BMI: &str = "bmi";
    pub const DIABETES_PEDIGREE_FUNCTION: &str = "diabetes_pedigree_function";
    pub const AGE: &str = "age";
    pub const DIAGNOSIS: &str = "diagnosis";
}

/// The kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Continuous or count-valued measurement; imputed and scaled.
    Numeric,
    /// Two-valued feature; imputed but never scaled.
    Binary,
    /// The label column; present only in Learning mode.
    Target,
}

/// A named, typed schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDescriptor {
    pub name: &'static str,
    pub kind: FeatureKind,
}

impl FeatureDescriptor {
    pub const fn new(name: &'static str, kind: FeatureKind) -> Self {
        Self { name, kind }
    }
}

/// Ordered catalog of the fields every record must expose before and after
/// transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    descriptors: Vec<FeatureDescriptor>,
}

impl FeatureSchema {
    /// Version of the descriptor set. Persisted fitted parameters record the
    /// version they were fitted under and are rejected on mismatch.
    pub const VERSION: u32 = 1;

    /// Build a schema from descriptors, validating the contract invariants:
    /// exactly one target, and feature names disjoint from the target name.
    pub fn new(descriptors: Vec<FeatureDescriptor>) -> Result<Self> {
        let targets: Vec<_> = descriptors
            .iter()
            .filter(|d| d.kind == FeatureKind::Target)
            .collect();
        if targets.len() != 1 {
            return Err(PipelineError::SchemaMismatch(format!(
                "schema must declare exactly one target column, found {}",
                targets.len()
            )));
        }
        let target = targets[0].name;
        for d in &descriptors {
            if d.kind != FeatureKind::Target && d.name == target {
                return Err(PipelineError::SchemaMismatch(format!(
                    "feature column '{}' collides with the target column",
                    d.name
                )));
            }
        }
        Ok(Self { descriptors })
    }

    /// The screening feature catalog: seven raw clinical measurements plus
    /// the derived age, all numeric, and the boolean diagnosis target.
    pub fn screening() -> Self {
        use FeatureKind::*;
        Self {
            descriptors: vec![
                FeatureDescriptor::new(columns::PREGNANCIES, Numeric),
                FeatureDescriptor::new(columns::GLUCOSE, Numeric),
                FeatureDescriptor::new(columns::BLOOD_PRESSURE, Numeric),
                FeatureDescriptor::new(columns::SKIN_THICKNESS, Numeric),
                FeatureDescriptor::new(columns::INSULIN, Numeric),
                FeatureDescriptor::new(columns::BMI, Numeric),
                FeatureDescriptor::new(columns::DIABETES_PEDIGREE_FUNCTION, Numeric),
                FeatureDescriptor::new(columns::AGE, Numeric),
                FeatureDescriptor::new(columns::DIAGNOSIS, Target),
            ],
        }
    }

    /// All descriptors, in contract order.
    pub fn descriptors(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    /// Ordered names of the non-target columns — the feature vector shape.
    pub fn feature_names(&self) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .filter(|d| d.kind != FeatureKind::Target)
            .map(|d| d.name)
            .collect()
    }

    /// Ordered names of the columns of one kind.
    pub fn names_of(&self, kind: FeatureKind) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.name)
            .collect()
    }

    pub fn numeric_names(&self) -> Vec<&'static str> {
        self.names_of(FeatureKind::Numeric)
    }

    pub fn binary_names(&self) -> Vec<&'static str> {
        self.names_of(FeatureKind::Binary)
    }

    /// Name of the target column.
    pub fn target(&self) -> &'static str {
        // new() guarantees exactly one target descriptor.
        self.descriptors
            .iter()
            .find(|d| d.kind == FeatureKind::Target)
            .map(|d| d.name)
            .unwrap_or(columns::DIAGNOSIS)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == name)
    }
}

/// Select the schema's feature columns from `df`, in contract order.
///
/// Fails with `SchemaMismatch` if any feature column is absent from the
/// frame — this is the single point where column membership is checked.
pub fn project_features(df: &DataFrame, schema: &FeatureSchema) -> Result<DataFrame> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for name in schema.feature_names() {
        if !present.iter().any(|p| p == name) {
            return Err(PipelineError::SchemaMismatch(format!(
                "column '{name}' is missing from the dataset"
            )));
        }
    }
    Ok(df.select(schema.feature_names())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_screening_feature_order_is_the_documented_contract() {
        let schema = FeatureSchema::screening();
        assert_eq!(
            schema.feature_names(),
            vec![
                "pregnancies",
                "glucose",
                "blood_pressure",
                "skin_thickness",
                "insulin",
                "bmi",
                "diabetes_pedigree_function",
                "age",
            ]
        );
        assert_eq!(schema.target(), "diagnosis");
    }

    #[test]
    fn test_screening_kinds() {
        let schema = FeatureSchema::screening();
        assert_eq!(schema.numeric_names().len(), 8);
        assert!(schema.binary_names().is_empty());
        assert!(schema.contains("glucose"));
        assert!(!schema.contains("cholesterol"));
    }

    #[test]
    fn test_schema_rejects_missing_target() {
        let result = FeatureSchema::new(vec![FeatureDescriptor::new(
            "glucose",
            FeatureKind::Numeric,
        )]);
        assert!(matches!(result, Err(PipelineError::SchemaMismatch(_))));
    }

    #[test]
    fn test_schema_rejects_feature_target_collision() {
        let result = FeatureSchema::new(vec![
            FeatureDescriptor::new("diagnosis", FeatureKind::Numeric),
            FeatureDescriptor::new("diagnosis", FeatureKind::Target),
        ]);
        assert!(matches!(result, Err(PipelineError::SchemaMismatch(_))));
    }

    #[test]
    fn test_project_features_orders_and_validates() {
        let schema = FeatureSchema::screening();
        // Columns deliberately out of contract order.
        let df = df![
            "age" => [30.0],
            "glucose" => [120.0],
            "pregnancies" => [1.0],
            "blood_pressure" => [70.0],
            "skin_thickness" => [20.0],
            "insulin" => [80.0],
            "bmi" => [28.5],
            "diabetes_pedigree_function" => [0.5],
        ]
        .unwrap();

        let projected = project_features(&df, &schema).unwrap();
        let names: Vec<String> = projected
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names[0], "pregnancies");
        assert_eq!(names[7], "age");
    }

    #[test]
    fn test_project_features_missing_column_is_schema_mismatch() {
        let schema = FeatureSchema::screening();
        let df = df!["glucose" => [120.0]].unwrap();
        let err = project_features(&df, &schema).unwrap_err();
        assert_eq!(err.code(), "SCHEMA_MISMATCH");
    }
}
