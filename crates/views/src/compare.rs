//! Side-by-side comparison of two employees.

use retention_core::Employee;

use crate::roi::format_currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    LowerIsBetter,
    HigherIsBetter,
}

/// Which side of a metric row is the more favourable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    First,
    Second,
    Neither,
}

/// Highlight only applies when both sides are numeric and differ.
pub fn highlight(first: Option<f64>, second: Option<f64>, preference: Preference) -> Highlight {
    let (Some(a), Some(b)) = (first, second) else {
        return Highlight::Neither;
    };
    if !a.is_finite() || !b.is_finite() || a == b {
        return Highlight::Neither;
    }
    let first_wins = match preference {
        Preference::LowerIsBetter => a < b,
        Preference::HigherIsBetter => a > b,
    };
    if first_wins {
        Highlight::First
    } else {
        Highlight::Second
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFormat {
    Number,
    Currency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: &'static str,
    pub first: Option<f64>,
    pub second: Option<f64>,
    pub preference: Preference,
    pub format: MetricFormat,
    pub highlight: Highlight,
}

impl MetricRow {
    fn new(
        label: &'static str,
        first: Option<f64>,
        second: Option<f64>,
        preference: Preference,
        format: MetricFormat,
    ) -> Self {
        Self {
            label,
            first,
            second,
            preference,
            format,
            highlight: highlight(first, second, preference),
        }
    }

    pub fn display_first(&self) -> String {
        self.display(self.first)
    }

    pub fn display_second(&self) -> String {
        self.display(self.second)
    }

    fn display(&self, value: Option<f64>) -> String {
        match (value, self.format) {
            (None, _) => "n/a".to_string(),
            (Some(v), MetricFormat::Currency) => format!("${}", format_currency(v)),
            (Some(v), MetricFormat::Number) if v.fract() == 0.0 => format!("{:.0}", v),
            (Some(v), MetricFormat::Number) => format!("{:.1}", v),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonView {
    first: Employee,
    second: Employee,
    rows: Vec<MetricRow>,
}

impl ComparisonView {
    pub fn new(first: Employee, second: Employee) -> Self {
        let rows = vec![
            MetricRow::new(
                "Priority Score",
                first.priority_score,
                second.priority_score,
                Preference::LowerIsBetter,
                MetricFormat::Number,
            ),
            MetricRow::new(
                "Experience (Yrs)",
                first.experience_years(),
                second.experience_years(),
                Preference::HigherIsBetter,
                MetricFormat::Number,
            ),
            MetricRow::new(
                "Tenure (Yrs)",
                first.tenure_years(),
                second.tenure_years(),
                Preference::HigherIsBetter,
                MetricFormat::Number,
            ),
            MetricRow::new(
                "Income",
                first.monthly_income(),
                second.monthly_income(),
                Preference::HigherIsBetter,
                MetricFormat::Currency,
            ),
        ];
        Self {
            first,
            second,
            rows,
        }
    }

    pub fn first(&self) -> &Employee {
        &self.first
    }

    pub fn second(&self) -> &Employee {
        &self.second
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }
}
