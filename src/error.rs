use std::path::PathBuf;

use thiserror::Error;

/// A submitted value that is missing, unreadable or outside its bounds.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} has an invalid value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// A categorical label with no entry in its lookup table.
///
/// The form only offers table keys, so this indicates a logic error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("no code for {field} label {label:?}")]
    UnknownLabel { field: &'static str, label: String },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported model artifact {}: expected a .json forest or a .pt TorchScript module", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("feature schema mismatch: model expects {found:?}, encoder produces {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("model classes must be [0, 1], got {0:?}")]
    Classes(Vec<i64>),

    #[error("model contains no trees")]
    EmptyForest,

    #[error("tree {tree}: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("unexpected model output: {0}")]
    Output(String),

    #[cfg(feature = "torchscript")]
    #[error(transparent)]
    Torch(#[from] tch::TchError),
}

/// Everything that can stop one submission from producing an assessment.
#[derive(Debug, Error)]
pub enum AssessError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl AssessError {
    /// Input errors belong to the user; the rest are internal failures.
    pub fn is_user_error(&self) -> bool {
        matches!(self, AssessError::Input(_))
    }
}
