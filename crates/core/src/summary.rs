use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Head-count per risk tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    #[serde(rename = "High", default)]
    pub high: u64,
    #[serde(rename = "Medium", default)]
    pub medium: u64,
    #[serde(rename = "Low", default)]
    pub low: u64,
}

impl RiskBreakdown {
    pub fn total(&self) -> u64 {
        self.high + self.medium + self.low
    }
}

/// A `[label, count]` pair from `top_risk_factors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorCount(pub String, pub u64);

impl FactorCount {
    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn count(&self) -> u64 {
        self.1
    }
}

/// Aggregate analytics from `GET /dashboard/summary`.
///
/// Before any upload the backend answers with a reduced shape that omits
/// `department_risk` and `top_risk_factors`, so every collection defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total_employees: u64,
    #[serde(default)]
    pub risk_breakdown: RiskBreakdown,
    #[serde(default)]
    pub department_risk: IndexMap<String, u64>,
    #[serde(default)]
    pub top_risk_factors: Vec<FactorCount>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub critical_talent: u64,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.total_employees == 0
    }

    pub fn high_risk_count(&self) -> u64 {
        self.risk_breakdown.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_summary() {
        let json = r#"{
            "total_employees": 10,
            "risk_breakdown": {"High": 3, "Medium": 2, "Low": 5},
            "critical_talent": 2,
            "department_risk": {"Sales": 2, "R&D": 1},
            "top_risk_factors": [["Overtime: frequent", 4], ["Low income: below peers", 2]],
            "insights": ["3 employees (30%) are identified as High Risk."]
        }"#;
        let summary: Summary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.total_employees, 10);
        assert_eq!(summary.risk_breakdown.total(), 10);
        assert_eq!(summary.high_risk_count(), 3);
        let depts: Vec<_> = summary.department_risk.keys().cloned().collect();
        assert_eq!(depts, vec!["Sales", "R&D"]);
        assert_eq!(summary.top_risk_factors[0].label(), "Overtime: frequent");
        assert_eq!(summary.top_risk_factors[0].count(), 4);
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_empty_state_summary() {
        let json = r#"{
            "total_employees": 0,
            "risk_breakdown": {"High": 0, "Medium": 0, "Low": 0},
            "critical_talent": 0,
            "insights": ["Please upload a dataset to generate insights."]
        }"#;
        let summary: Summary = serde_json::from_str(json).unwrap();
        assert!(summary.is_empty());
        assert!(summary.department_risk.is_empty());
        assert!(summary.top_risk_factors.is_empty());
    }
}
