use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Low,
}

/// How a message is styled on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Warning,
    Success,
}

impl Style {
    pub fn css_class(self) -> &'static str {
        match self {
            Style::Warning => "warning",
            Style::Success => "success",
        }
    }
}

/// The user-facing outcome of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Confidence in `level`, not in class 1.
    pub confidence: f64,
}

/// High risk reports `probability` as its confidence, low risk reports
/// `1 - probability`.
pub fn present(prediction: u8, probability: f64) -> RiskAssessment {
    if prediction == 1 {
        RiskAssessment {
            level: RiskLevel::High,
            confidence: probability,
        }
    } else {
        RiskAssessment {
            level: RiskLevel::Low,
            confidence: 1.0 - probability,
        }
    }
}

impl RiskAssessment {
    pub fn style(&self) -> Style {
        match self.level {
            RiskLevel::High => Style::Warning,
            RiskLevel::Low => Style::Success,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self.level {
            RiskLevel::High => "⚠️",
            RiskLevel::Low => "✅",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.level {
            RiskLevel::High => "High Risk of Heart Disease",
            RiskLevel::Low => "Low Risk of Heart Disease",
        };
        write!(f, "{label} (Confidence: {:.2})", self.confidence)
    }
}
