//! Feature transformation pipeline for diabetes-risk screening.
//!
//! Converts raw clinical observation records into fixed, model-ready
//! feature vectors — identically at training time and at serving time.
//! The engine is two-mode:
//!
//! - **Fit mode** ([`LearningPipeline`]): derive age, project to the
//!   feature schema, split train/test deterministically, fit imputation
//!   medians and scale parameters *on the train partition only*, apply
//!   them to both partitions, and persist them.
//! - **Apply mode** ([`ServingPipeline`]): load the persisted statistics
//!   once and transform incoming batches with them, never refitting.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dia_pipeline::{CsvSource, LearningPipeline, ObservationSource, PipelineConfig, ServingPipeline};
//!
//! // Training time: fit and persist statistics.
//! let config = PipelineConfig::builder().artifacts_dir("artifacts").build()?;
//! let records = CsvSource::new("screening.csv").fetch().await?;
//! let output = LearningPipeline::new(config.clone())?.run(records)?;
//! println!("train rows: {}", output.train_features.height());
//!
//! // Serving time: reuse them, batch after batch.
//! let serving = ServingPipeline::load(&config)?;
//! let features = serving.transform(&batch)?;
//! ```
//!
//! # Train/serve parity
//!
//! Both variants share one apply path; they differ only in the
//! [`StatisticsProvider`] they run with (fit-and-persist vs
//! load-persisted). A record transformed at serving time with persisted
//! parameters is byte-identical to what the learning run's own apply path
//! would have produced for it.

pub mod age;
pub mod config;
pub mod dataset;
pub mod error;
pub mod impute;
pub mod pipeline;
pub mod scale;
pub mod schema;
pub mod source;
pub mod split;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_RANDOM_SEED, DEFAULT_TEST_SIZE};
pub use error::{PipelineError, Result};
pub use impute::MedianImputer;
pub use pipeline::{
    FitAndPersist, LearningOutput, LearningPipeline, LoadPersisted, ServingPipeline,
    StatisticsProvider,
};
pub use scale::StandardScaler;
pub use schema::{FeatureDescriptor, FeatureKind, FeatureSchema};
pub use source::{CsvSource, ObservationSource, ScreeningRecord};
pub use store::ParameterStore;
pub use types::{ColumnScale, FittedParameters, ImputationMedians, ScaleParameters};
