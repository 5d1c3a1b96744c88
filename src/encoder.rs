//! Categorical lookup tables and the feature row handed to the classifier.
//!
//! The integer codes are the ones the classifier was trained on. The form
//! builds its select boxes from the same tables, so any label it can submit
//! has a code.

use serde::Serialize;

use crate::error::EncodeError;
use crate::types::PatientInput;

/// Fixed label → code mapping for one categorical field.
#[derive(Debug, Clone, Copy)]
pub struct LookupTable {
    pub field: &'static str,
    pub label: &'static str,
    pub entries: &'static [(&'static str, i64)],
}

impl LookupTable {
    pub fn code(&self, label: &str) -> Result<i64, EncodeError> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, code)| *code)
            .ok_or_else(|| EncodeError::UnknownLabel {
                field: self.field,
                label: label.to_string(),
            })
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(l, _)| *l)
    }

    pub fn first_label(&self) -> &'static str {
        self.entries[0].0
    }
}

pub const SEX: LookupTable = LookupTable {
    field: "sex",
    label: "Sex",
    entries: &[("male", 1), ("female", 0)],
};

pub const CP: LookupTable = LookupTable {
    field: "cp",
    label: "Chest Pain Type",
    entries: &[
        ("typical angina", 0),
        ("atypical angina", 1),
        ("non-anginal pain", 2),
        ("asymptomatic", 3),
    ],
};

pub const FBS: LookupTable = LookupTable {
    field: "fbs",
    label: "Fasting Blood Sugar > 120 mg/dl",
    entries: &[("True", 1), ("False", 0)],
};

pub const RESTECG: LookupTable = LookupTable {
    field: "restecg",
    label: "Resting ECG",
    entries: &[
        ("normal", 0),
        ("ST-T wave abnormality", 1),
        ("left ventricular hypertrophy", 2),
    ],
};

pub const EXANG: LookupTable = LookupTable {
    field: "exang",
    label: "Exercise Induced Angina",
    entries: &[("Yes", 1), ("No", 0)],
};

pub const SLOPE: LookupTable = LookupTable {
    field: "slope",
    label: "Slope of ST Segment",
    entries: &[("upsloping", 0), ("flat", 1), ("downsloping", 2)],
};

pub const THAL: LookupTable = LookupTable {
    field: "thal",
    label: "Thalassemia",
    entries: &[("normal", 1), ("fixed defect", 2), ("reversible defect", 3)],
};

pub const CATEGORICAL_TABLES: [&LookupTable; 7] = [&SEX, &CP, &FBS, &RESTECG, &EXANG, &SLOPE, &THAL];

pub const N_FEATURES: usize = 13;

/// Column names in training order. `thalch` is the training data's spelling.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalch", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// One encoded row, fields in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRow {
    pub age: i64,
    pub sex: i64,
    pub cp: i64,
    pub trestbps: i64,
    pub chol: i64,
    pub fbs: i64,
    pub restecg: i64,
    pub thalch: i64,
    pub exang: i64,
    pub oldpeak: f64,
    pub slope: i64,
    pub ca: i64,
    pub thal: i64,
}

impl FeatureRow {
    /// Values as the classifier consumes them, in column order.
    pub fn values(&self) -> [f64; N_FEATURES] {
        [
            self.age as f64,
            self.sex as f64,
            self.cp as f64,
            self.trestbps as f64,
            self.chol as f64,
            self.fbs as f64,
            self.restecg as f64,
            self.thalch as f64,
            self.exang as f64,
            self.oldpeak,
            self.slope as f64,
            self.ca as f64,
            self.thal as f64,
        ]
    }

    /// `(column, value)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.values())
    }
}

pub fn encode(input: &PatientInput) -> Result<FeatureRow, EncodeError> {
    Ok(FeatureRow {
        age: input.age,
        sex: SEX.code(&input.sex)?,
        cp: CP.code(&input.cp)?,
        trestbps: input.trestbps,
        chol: input.chol,
        fbs: FBS.code(&input.fbs)?,
        restecg: RESTECG.code(&input.restecg)?,
        thalch: input.thalach,
        exang: EXANG.code(&input.exang)?,
        oldpeak: input.oldpeak,
        slope: SLOPE.code(&input.slope)?,
        ca: input.ca,
        thal: THAL.code(&input.thal)?,
    })
}
