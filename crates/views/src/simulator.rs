//! What-if retention simulator.

use retention_client::{ApiError, Backend};
use retention_core::{ChangeSet, RawData, SimulationOutcome, SimulationResult};
use tracing::{debug, error, info};

/// Income assumed when the record carries no usable raw monthly income.
/// A recorded income of zero counts as unusable.
pub const DEFAULT_BASE_INCOME: f64 = 5000.0;

pub const SIMULATION_FAILED: &str = "Failed to run simulation";

pub fn projected_income(base_income: f64, salary_change_pct: f64) -> f64 {
    base_income * (1.0 + salary_change_pct / 100.0)
}

/// Display form of the projected retention probability, e.g. `0.35 → "65%"`.
pub fn format_retention(new_probability: f64) -> String {
    format!("{:.0}%", 100.0 - new_probability * 100.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interventions {
    pub promotion: bool,
    pub remote_work: bool,
    pub training: bool,
}

#[derive(Debug, Clone)]
pub struct Simulator {
    employee_id: String,
    base_income: Option<f64>,
    pub salary_change_pct: f64,
    pub interventions: Interventions,
    busy: bool,
    result: Option<SimulationResult>,
    error: Option<String>,
}

impl Simulator {
    pub fn new(employee_id: impl Into<String>, raw: Option<&RawData>) -> Self {
        Self {
            employee_id: employee_id.into(),
            base_income: raw
                .and_then(|r| r.monthly_income)
                .filter(|income| *income != 0.0 && !income.is_nan()),
            salary_change_pct: 0.0,
            interventions: Interventions::default(),
            busy: false,
            result: None,
            error: None,
        }
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    pub fn base_income(&self) -> f64 {
        self.base_income.unwrap_or(DEFAULT_BASE_INCOME)
    }

    pub fn change_set(&self) -> ChangeSet {
        ChangeSet {
            monthly_income: projected_income(self.base_income(), self.salary_change_pct),
            promotion: self.interventions.promotion,
            remote_work: self.interventions.remote_work,
            training: self.interventions.training,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Lock the trigger and clear the previous projection. `None` while a
    /// request is already outstanding.
    pub fn begin(&mut self) -> Option<ChangeSet> {
        if self.busy {
            debug!(employee = %self.employee_id, "Simulation already running");
            return None;
        }
        self.busy = true;
        self.result = None;
        self.error = None;
        Some(self.change_set())
    }

    pub fn finish(&mut self, outcome: Result<SimulationOutcome, ApiError>) {
        self.busy = false;
        match outcome {
            Ok(SimulationOutcome::Completed(result)) => {
                info!(
                    employee = %self.employee_id,
                    from = %result.original_risk,
                    to = %result.new_risk,
                    "Simulation complete"
                );
                self.result = Some(result);
            }
            Ok(SimulationOutcome::Rejected { error }) => {
                self.error = Some(error);
            }
            Err(e) => {
                error!(employee = %self.employee_id, error = %e, "Simulation request failed");
                self.error = Some(e.describe_or(SIMULATION_FAILED));
            }
        }
    }

    /// Run the simulation. Returns `false` if a run was already in flight.
    pub async fn submit(&mut self, backend: &dyn Backend) -> bool {
        let Some(changes) = self.begin() else {
            return false;
        };
        let outcome = backend.simulate(&self.employee_id, &changes).await;
        self.finish(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use retention_core::RiskLabel;

    fn raw(income: Option<f64>) -> RawData {
        RawData {
            monthly_income: income,
            ..RawData::default()
        }
    }

    fn completed(p: f64) -> SimulationOutcome {
        SimulationOutcome::Completed(SimulationResult {
            original_risk: RiskLabel::High,
            new_risk: RiskLabel::Medium,
            new_probability: p,
            original_probability: Some(0.7),
            changes_applied: None,
            factors_considered: Vec::new(),
        })
    }

    #[test]
    fn test_projected_income() {
        assert_eq!(projected_income(5000.0, 20.0), 6000.0);
        assert_eq!(projected_income(4000.0, 0.0), 4000.0);
        assert_eq!(projected_income(4000.0, -10.0), 3600.0);
    }

    #[test]
    fn test_format_retention() {
        assert_eq!(format_retention(0.35), "65%");
        assert_eq!(format_retention(0.99), "1%");
        assert_eq!(format_retention(0.0), "100%");
    }

    #[test]
    fn test_change_set_uses_raw_income() {
        let mut sim = Simulator::new("E1", Some(&raw(Some(5000.0))));
        sim.salary_change_pct = 20.0;
        sim.interventions.remote_work = true;
        let changes = sim.change_set();
        assert_eq!(changes.monthly_income, 6000.0);
        assert!(changes.remote_work);
        assert!(!changes.promotion);
    }

    #[test]
    fn test_missing_income_falls_back() {
        let sim = Simulator::new("E1", Some(&raw(None)));
        assert_eq!(sim.base_income(), DEFAULT_BASE_INCOME);
        let sim = Simulator::new("E1", None);
        assert_eq!(sim.change_set().monthly_income, DEFAULT_BASE_INCOME);
    }

    #[test]
    fn test_zero_income_falls_back() {
        let mut sim = Simulator::new("E1", Some(&raw(Some(0.0))));
        assert_eq!(sim.base_income(), DEFAULT_BASE_INCOME);
        sim.salary_change_pct = 10.0;
        assert!((sim.change_set().monthly_income - 5500.0).abs() < 1e-9);
    }

    #[test]
    fn test_begin_blocks_resubmission() {
        let mut sim = Simulator::new("E1", None);
        assert!(sim.begin().is_some());
        assert!(sim.is_busy());
        assert!(sim.begin().is_none());
        sim.finish(Ok(completed(0.35)));
        assert!(!sim.is_busy());
        assert!(sim.begin().is_some());
    }

    #[test]
    fn test_rejection_shows_error_without_projection() {
        let mut sim = Simulator::new("E1", None);
        sim.begin();
        sim.finish(Ok(SimulationOutcome::Rejected {
            error: "Raw data not available for simulation.".into(),
        }));
        assert_eq!(sim.error(), Some("Raw data not available for simulation."));
        assert!(sim.result().is_none());
    }

    #[test]
    fn test_transport_failure_uses_backend_detail() {
        let mut sim = Simulator::new("E1", None);
        sim.begin();
        sim.finish(Err(ApiError::from_body(404, r#"{"detail":"Employee not found"}"#.into())));
        assert_eq!(sim.error(), Some("Employee not found"));

        sim.begin();
        sim.finish(Err(ApiError::Parse("expected value".into())));
        assert_eq!(sim.error(), Some("failed to parse response: expected value"));
    }

    #[tokio::test]
    async fn test_submit_sends_change_set() {
        let backend = FakeBackend::default();
        backend.simulate_replies.lock().unwrap().push_back(Ok(completed(0.35)));

        let mut sim = Simulator::new("E7", Some(&raw(Some(5000.0))));
        sim.salary_change_pct = 20.0;
        sim.interventions.promotion = true;
        assert!(sim.submit(&backend).await);

        let calls = backend.simulate_calls.lock().unwrap();
        assert_eq!(calls[0].0, "E7");
        assert_eq!(calls[0].1.monthly_income, 6000.0);
        assert!(calls[0].1.promotion);

        let result = sim.result().unwrap();
        assert_eq!(result.new_risk, RiskLabel::Medium);
        assert_eq!(format_retention(result.new_probability), "65%");
        assert!(sim.error().is_none());
    }
}
