use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Risk tier ─────────────────────────────────────────────────

/// Attrition-risk tier assigned by the scoring service.
///
/// The backend emits the labels verbatim ("High Risk", "Medium Risk",
/// "Low Risk"). Anything else is kept as `Unknown` so a new tier never
/// breaks deserialisation of the whole employee list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RiskLabel {
    High,
    Medium,
    Low,
    Unknown(String),
}

impl RiskLabel {
    pub fn parse(label: &str) -> Self {
        match label {
            "High Risk" => RiskLabel::High,
            "Medium Risk" => RiskLabel::Medium,
            "Low Risk" => RiskLabel::Low,
            other => RiskLabel::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RiskLabel::High => "High Risk",
            RiskLabel::Medium => "Medium Risk",
            RiskLabel::Low => "Low Risk",
            RiskLabel::Unknown(s) => s,
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, RiskLabel::High)
    }
}

impl Default for RiskLabel {
    fn default() -> Self {
        RiskLabel::Unknown(String::new())
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for RiskLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RiskLabel::parse(&s))
    }
}

// ── Impact category ───────────────────────────────────────────

/// Business-criticality of an employee's departure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImpactCategory {
    Critical,
    Important,
    Standard,
    Unknown(String),
}

impl ImpactCategory {
    pub fn parse(category: &str) -> Self {
        match category {
            "Critical" => ImpactCategory::Critical,
            "Important" => ImpactCategory::Important,
            "Standard" => ImpactCategory::Standard,
            other => ImpactCategory::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImpactCategory::Critical => "Critical",
            ImpactCategory::Important => "Important",
            ImpactCategory::Standard => "Standard",
            ImpactCategory::Unknown(s) => s,
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, ImpactCategory::Critical)
    }
}

impl Default for ImpactCategory {
    fn default() -> Self {
        ImpactCategory::Unknown(String::new())
    }
}

impl std::fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for ImpactCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImpactCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ImpactCategory::parse(&s))
    }
}

// ── Employee record ───────────────────────────────────────────

/// Raw source columns pass through from the uploaded sheet unchecked, so a
/// numeric column may hold text. Anything that is not a JSON number reads
/// as missing instead of failing the whole record.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RiskAssessment {
    pub label: RiskLabel,
    #[serde(default)]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub category: ImpactCategory,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Source columns the backend keeps for comparison and simulation.
/// Columns beyond the three the UI reads are retained untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    #[serde(rename = "MonthlyIncome", default, deserialize_with = "lenient_number")]
    pub monthly_income: Option<f64>,
    #[serde(rename = "TotalWorkingYears", default, deserialize_with = "lenient_number")]
    pub total_working_years: Option<f64>,
    #[serde(rename = "YearsAtCompany", default, deserialize_with = "lenient_number")]
    pub years_at_company: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An employee as returned by `GET /employees` and `GET /employees/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "EmployeeID")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Department", default)]
    pub department: String,
    #[serde(rename = "Risk", default)]
    pub risk: RiskAssessment,
    #[serde(rename = "Impact", default)]
    pub impact: Impact,
    #[serde(rename = "PriorityScore", default, deserialize_with = "lenient_number")]
    pub priority_score: Option<f64>,
    #[serde(rename = "KeyFactors", default)]
    pub key_factors: Vec<String>,
    #[serde(rename = "RecommendedActions", default)]
    pub recommended_actions: Vec<String>,
    #[serde(rename = "RawData", default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<RawData>,
}

impl Employee {
    /// Case-insensitive substring match on name, identifier or department.
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.id.to_lowercase().contains(needle)
            || self.department.to_lowercase().contains(needle)
    }

    pub fn monthly_income(&self) -> Option<f64> {
        self.raw_data.as_ref().and_then(|r| r.monthly_income)
    }

    pub fn experience_years(&self) -> Option<f64> {
        self.raw_data.as_ref().and_then(|r| r.total_working_years)
    }

    pub fn tenure_years(&self) -> Option<f64> {
        self.raw_data.as_ref().and_then(|r| r.years_at_company)
    }
}
