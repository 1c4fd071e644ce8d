//! Summary analytics view model.

use retention_client::{ApiError, Backend, Fence, Ticket};
use retention_core::Summary;
use tracing::{error, warn};

use crate::roi::RoiCalculator;

pub const EMPTY_TITLE: &str = "No Data Available";
pub const EMPTY_HINT: &str = "Go to the Import tab to import your employee data.";
pub const NO_INSIGHTS: &str = "No specific insights generated yet.";

/// Chart label for a risk factor: the text before its first `:`.
pub fn short_factor_label(label: &str) -> &str {
    label.split(':').next().unwrap_or(label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kpis {
    pub total_employees: u64,
    pub high_risk: u64,
    pub critical_talent: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskShare {
    pub tier: &'static str,
    pub count: u64,
    /// Fraction of the breakdown total, 0.0 when the total is zero.
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub kpis: Kpis,
    pub risk_shares: Vec<RiskShare>,
    pub departments: Vec<Bar>,
    pub factors: Vec<Bar>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardModel {
    /// Nothing imported yet: show the call-to-action instead of charts.
    Empty,
    Populated(DashboardData),
}

impl DashboardModel {
    pub fn from_summary(summary: Option<&Summary>) -> Self {
        let Some(summary) = summary.filter(|s| !s.is_empty()) else {
            return DashboardModel::Empty;
        };

        let breakdown = &summary.risk_breakdown;
        let total = breakdown.total();
        let share = |tier: &'static str, count: u64| RiskShare {
            tier,
            count,
            fraction: if total == 0 { 0.0 } else { count as f64 / total as f64 },
        };

        DashboardModel::Populated(DashboardData {
            kpis: Kpis {
                total_employees: summary.total_employees,
                high_risk: breakdown.high,
                critical_talent: summary.critical_talent,
            },
            risk_shares: vec![
                share("High", breakdown.high),
                share("Medium", breakdown.medium),
                share("Low", breakdown.low),
            ],
            departments: summary
                .department_risk
                .iter()
                .map(|(dept, count)| Bar {
                    label: dept.clone(),
                    value: *count,
                })
                .collect(),
            factors: summary
                .top_risk_factors
                .iter()
                .map(|f| Bar {
                    label: short_factor_label(f.label()).to_string(),
                    value: f.count(),
                })
                .collect(),
            insights: summary.insights.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    summary: Option<Summary>,
    loading: bool,
    last_error: Option<String>,
    fence: Fence,
    pub roi: RoiCalculator,
}

impl Dashboard {
    pub fn new(roi: RoiCalculator) -> Self {
        Self {
            summary: None,
            loading: true,
            last_error: None,
            fence: Fence::new(),
            roi,
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set when the latest fetch failed. A previously loaded summary is kept.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn model(&self) -> DashboardModel {
        DashboardModel::from_summary(self.summary.as_ref())
    }

    pub fn high_risk_count(&self) -> u64 {
        self.summary.as_ref().map_or(0, |s| s.high_risk_count())
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        self.fence.issue()
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<Summary, ApiError>) -> bool {
        if !self.fence.is_current(ticket) {
            warn!(?ticket, "Discarding stale summary response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(summary) => {
                self.summary = Some(summary);
                self.last_error = None;
            }
            Err(e) => {
                error!(error = %e, "Failed to load dashboard summary");
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    pub async fn refresh(&mut self, backend: &dyn Backend) {
        let ticket = self.begin_refresh();
        let result = backend.summary().await;
        self.apply(ticket, result);
    }
}
