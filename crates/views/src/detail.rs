use retention_client::{ApiError, Backend, Fence, Ticket};
use retention_core::Employee;
use tracing::{error, warn};

use crate::email::EmailGenerator;
use crate::simulator::Simulator;

pub const DETAIL_FAILED: &str = "Employee not found";

/// One employee's narrative plus the embedded simulator and email drafter.
#[derive(Debug)]
pub struct EmployeeDetail {
    id: String,
    employee: Option<Employee>,
    loading: bool,
    error: Option<String>,
    fence: Fence,
    simulator: Option<Simulator>,
    email: Option<EmailGenerator>,
}

impl EmployeeDetail {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            employee: None,
            loading: true,
            error: None,
            fence: Fence::new(),
            simulator: None,
            email: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn employee(&self) -> Option<&Employee> {
        self.employee.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Present only when the record carries raw source data.
    pub fn simulator_mut(&mut self) -> Option<&mut Simulator> {
        self.simulator.as_mut()
    }

    pub fn simulator(&self) -> Option<&Simulator> {
        self.simulator.as_ref()
    }

    pub fn email_mut(&mut self) -> Option<&mut EmailGenerator> {
        self.email.as_mut()
    }

    pub fn email(&self) -> Option<&EmailGenerator> {
        self.email.as_ref()
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        self.fence.issue()
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<Employee, ApiError>) -> bool {
        if !self.fence.is_current(ticket) {
            warn!(?ticket, id = %self.id, "Discarding stale employee detail");
            return false;
        }
        self.loading = false;
        match result {
            Ok(employee) => {
                self.simulator = employee
                    .raw_data
                    .as_ref()
                    .map(|raw| Simulator::new(employee.id.clone(), Some(raw)));
                self.email = Some(EmailGenerator::new(&employee));
                self.employee = Some(employee);
                self.error = None;
            }
            Err(e) => {
                error!(id = %self.id, error = %e, "Failed to load employee");
                self.error = Some(e.describe_or(DETAIL_FAILED));
            }
        }
        true
    }

    pub async fn refresh(&mut self, backend: &dyn Backend) {
        let ticket = self.begin_refresh();
        let result = backend.employee(&self.id).await;
        self.apply(ticket, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{employee, FakeBackend};
    use retention_core::{ImpactCategory, RiskLabel};

    #[tokio::test]
    async fn test_loads_record_with_tools() {
        let backend = FakeBackend::with_employees(vec![employee(
            "E1",
            "Ana",
            "Sales",
            RiskLabel::High,
            ImpactCategory::Critical,
        )]);
        let mut detail = EmployeeDetail::new("E1");
        detail.refresh(&backend).await;
        assert_eq!(detail.employee().unwrap().name, "Ana");
        assert_eq!(detail.simulator().unwrap().employee_id(), "E1");
        assert!(detail.email().unwrap().prompt().contains("Ana"));
    }

    #[tokio::test]
    async fn test_no_raw_data_means_no_simulator() {
        let mut e = employee("E2", "Ben", "HR", RiskLabel::Low, ImpactCategory::Standard);
        e.raw_data = None;
        let backend = FakeBackend::with_employees(vec![e]);
        let mut detail = EmployeeDetail::new("E2");
        detail.refresh(&backend).await;
        assert!(detail.simulator().is_none());
        assert!(detail.email().is_some());
    }

    #[tokio::test]
    async fn test_missing_employee_surfaces_detail() {
        let backend = FakeBackend::default();
        let mut detail = EmployeeDetail::new("nobody");
        detail.refresh(&backend).await;
        assert_eq!(detail.error(), Some("Employee not found"));
        assert!(detail.employee().is_none());
        assert!(!detail.is_loading());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_error_message() {
        let backend = FakeBackend::with_employees(vec![employee(
            "E3",
            "Cleo",
            "IT",
            RiskLabel::Medium,
            ImpactCategory::Important,
        )]);
        let mut detail = EmployeeDetail::new("E3");
        detail.refresh(&backend).await;
        assert!(detail.error().is_none());

        *backend.employee_fails.lock().unwrap() = true;
        detail.refresh(&backend).await;
        assert_eq!(detail.error(), Some("API error 503: Service Unavailable"));
        assert_eq!(detail.employee().unwrap().name, "Cleo");
    }
}
