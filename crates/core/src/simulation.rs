use serde::{Deserialize, Serialize};

use crate::employee::RiskLabel;

/// Hypothetical attribute changes sent to `POST /simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(rename = "MonthlyIncome")]
    pub monthly_income: f64,
    #[serde(rename = "Promotion")]
    pub promotion: bool,
    #[serde(rename = "RemoteWork")]
    pub remote_work: bool,
    #[serde(rename = "Training")]
    pub training: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub original_risk: RiskLabel,
    pub new_risk: RiskLabel,
    pub new_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_applied: Option<serde_json::Value>,
    #[serde(default)]
    pub factors_considered: Vec<String>,
}

impl SimulationResult {
    /// Projected chance of staying, as a percentage.
    pub fn retention_percent(&self) -> f64 {
        100.0 - self.new_probability * 100.0
    }
}

/// Body of a `POST /simulate` answer. The backend reports model failures
/// in-band as `{"error": "..."}` with a 200 status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimulationOutcome {
    Rejected { error: String },
    Completed(SimulationResult),
}
