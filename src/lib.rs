//! Heart disease risk prediction behind a single HTML form.
//!
//! A submission is validated against the form's bounds, encoded into the
//! classifier's 13-column feature row, scored once by a model loaded at
//! startup, and rendered as a high/low risk message with a confidence.

pub mod config;
pub mod encoder;
pub mod error;
pub mod forest;
pub mod form;
pub mod model;
pub mod pipeline;
pub mod presenter;
pub mod server;
pub mod types;

pub use encoder::{encode, FeatureRow, FEATURE_NAMES};
pub use error::{AssessError, EncodeError, InputError, ModelError};
pub use model::Model;
pub use pipeline::{assess, Assessment};
pub use presenter::{present, RiskAssessment, RiskLevel};
pub use types::PatientInput;
