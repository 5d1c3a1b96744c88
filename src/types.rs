use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Raw form submission for one patient.
///
/// Categorical fields carry the human-readable label exactly as the form
/// offers it; they are resolved to model codes by [`crate::encoder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: i64,
    pub sex: String,
    /// Chest pain type.
    pub cp: String,
    /// Resting blood pressure (mm Hg).
    pub trestbps: i64,
    /// Serum cholesterol (mg/dl).
    pub chol: i64,
    /// Fasting blood sugar > 120 mg/dl.
    pub fbs: String,
    /// Resting ECG.
    pub restecg: String,
    /// Max heart rate achieved. The model column is spelled `thalch`.
    pub thalach: i64,
    /// Exercise induced angina.
    pub exang: String,
    /// ST depression induced by exercise relative to rest.
    pub oldpeak: f64,
    /// Slope of the peak exercise ST segment.
    pub slope: String,
    /// Number of major vessels (0-3) colored by fluoroscopy.
    pub ca: i64,
    /// Thalassemia.
    pub thal: String,
}

/// Bounds and presentation of one numeric form input.
#[derive(Debug, Clone, Copy)]
pub struct NumericField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl NumericField {
    /// Inclusive range check; NaN and infinities never pass.
    pub fn check(&self, value: f64) -> Result<(), InputError> {
        if value.is_finite() && value >= self.min && value <= self.max {
            Ok(())
        } else {
            Err(InputError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    pub fn is_integer(&self) -> bool {
        self.step.fract() == 0.0
    }
}

pub const AGE: NumericField = NumericField {
    name: "age",
    label: "Age",
    min: 1.0,
    max: 120.0,
    step: 1.0,
    default: 50.0,
};

pub const TRESTBPS: NumericField = NumericField {
    name: "trestbps",
    label: "Resting Blood Pressure",
    min: 80.0,
    max: 200.0,
    step: 1.0,
    default: 120.0,
};

pub const CHOL: NumericField = NumericField {
    name: "chol",
    label: "Cholesterol",
    min: 100.0,
    max: 600.0,
    step: 1.0,
    default: 200.0,
};

pub const THALACH: NumericField = NumericField {
    name: "thalach",
    label: "Max Heart Rate Achieved",
    min: 60.0,
    max: 220.0,
    step: 1.0,
    default: 150.0,
};

pub const OLDPEAK: NumericField = NumericField {
    name: "oldpeak",
    label: "Oldpeak (ST depression)",
    min: 0.0,
    max: 10.0,
    step: 0.1,
    default: 0.0,
};

pub const CA: NumericField = NumericField {
    name: "ca",
    label: "Number of major vessels (0–3) colored by fluoroscopy",
    min: 0.0,
    max: 3.0,
    step: 1.0,
    default: 0.0,
};

/// Choices offered for `ca`; rendered as a select box rather than a number input.
pub const CA_CHOICES: [i64; 4] = [0, 1, 2, 3];

impl PatientInput {
    /// Enforces the numeric bounds the form widgets declare.
    ///
    /// Categorical labels are not checked here; an unknown label is an
    /// encoding failure, not a user error.
    pub fn validate(&self) -> Result<(), InputError> {
        AGE.check(self.age as f64)?;
        TRESTBPS.check(self.trestbps as f64)?;
        CHOL.check(self.chol as f64)?;
        THALACH.check(self.thalach as f64)?;
        OLDPEAK.check(self.oldpeak)?;
        CA.check(self.ca as f64)?;
        Ok(())
    }
}

impl Default for PatientInput {
    /// The values a fresh form starts with: numeric defaults, first option
    /// of every select box.
    fn default() -> Self {
        use crate::encoder::{CP, EXANG, FBS, RESTECG, SEX, SLOPE, THAL};

        Self {
            age: AGE.default as i64,
            sex: SEX.first_label().to_string(),
            cp: CP.first_label().to_string(),
            trestbps: TRESTBPS.default as i64,
            chol: CHOL.default as i64,
            fbs: FBS.first_label().to_string(),
            restecg: RESTECG.first_label().to_string(),
            thalach: THALACH.default as i64,
            exang: EXANG.first_label().to_string(),
            oldpeak: OLDPEAK.default,
            slope: SLOPE.first_label().to_string(),
            ca: CA_CHOICES[0],
            thal: THAL.first_label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form() {
        let p = PatientInput::default();
        assert_eq!(p.age, 50);
        assert_eq!(p.sex, "male");
        assert_eq!(p.cp, "typical angina");
        assert_eq!(p.trestbps, 120);
        assert_eq!(p.chol, 200);
        assert_eq!(p.fbs, "True");
        assert_eq!(p.thalach, 150);
        assert_eq!(p.exang, "Yes");
        assert_eq!(p.oldpeak, 0.0);
        assert_eq!(p.thal, "normal");
        assert!(p.validate().is_ok());
    }

    #[test]
    fn upper_bounds_inclusive() {
        let p = PatientInput {
            age: 120,
            chol: 600,
            oldpeak: 10.0,
            ..PatientInput::default()
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn below_minimum_rejected() {
        let p = PatientInput {
            age: 0,
            ..PatientInput::default()
        };
        match p.validate() {
            Err(InputError::OutOfRange { field, .. }) => assert_eq!(field, "age"),
            other => panic!("expected age rejection, got {other:?}"),
        }

        let p = PatientInput {
            chol: 99,
            ..PatientInput::default()
        };
        assert!(matches!(
            p.validate(),
            Err(InputError::OutOfRange { field: "chol", .. })
        ));
    }

    #[test]
    fn non_finite_oldpeak_rejected() {
        let p = PatientInput {
            oldpeak: f64::NAN,
            ..PatientInput::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn ca_outside_choices_rejected() {
        let p = PatientInput {
            ca: 4,
            ..PatientInput::default()
        };
        assert!(p.validate().is_err());
    }
}
