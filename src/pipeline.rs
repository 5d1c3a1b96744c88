use crate::encoder::{self, FeatureRow};
use crate::error::AssessError;
use crate::model::Model;
use crate::presenter::{self, RiskAssessment};
use crate::types::PatientInput;

/// Result of running one submission through the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub features: FeatureRow,
    pub prediction: u8,
    pub probability: f64,
    pub risk: RiskAssessment,
}

/// validate → encode → predict → present, all or nothing.
pub fn assess(model: &Model, input: &PatientInput) -> Result<Assessment, AssessError> {
    input.validate()?;
    let features = encoder::encode(input)?;
    tracing::debug!(
        "encoded row: {}",
        features
            .columns()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let prediction = model.predict(&features)?;
    let probability = model.predict_proba(&features)?;
    let risk = presenter::present(prediction, probability);

    Ok(Assessment {
        features,
        prediction,
        probability,
        risk,
    })
}
