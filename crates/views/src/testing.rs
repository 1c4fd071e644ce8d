//! In-memory `Backend` for view tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use retention_client::{ApiError, Backend};
use retention_core::{
    ChangeSet, ChatMessage, Employee, Impact, ImpactCategory, RawData, RiskAssessment, RiskLabel,
    SimulationOutcome, Summary, UploadFile, UploadReceipt,
};

pub fn employee(id: &str, name: &str, department: &str, risk: RiskLabel, impact: ImpactCategory) -> Employee {
    Employee {
        id: id.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        risk: RiskAssessment {
            label: risk,
            probability: Some(0.5),
        },
        impact: Impact {
            category: impact,
            explanation: "Standard business impact role.".to_string(),
            score: None,
        },
        priority_score: Some(50.0),
        key_factors: vec!["Overtime: frequent".to_string()],
        recommended_actions: vec!["Monitor during regular review cycles.".to_string()],
        raw_data: Some(RawData {
            monthly_income: Some(5000.0),
            total_working_years: Some(10.0),
            years_at_company: Some(4.0),
            extra: Default::default(),
        }),
    }
}

pub fn unavailable() -> ApiError {
    ApiError::from_body(503, "Service Unavailable".to_string())
}

#[derive(Default)]
pub struct FakeBackend {
    pub employees: Mutex<Vec<Employee>>,
    pub summary: Mutex<Option<Summary>>,
    pub employee_fails: Mutex<bool>,
    pub chat_replies: Mutex<VecDeque<Result<String, ApiError>>>,
    pub chat_calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    pub simulate_replies: Mutex<VecDeque<Result<SimulationOutcome, ApiError>>>,
    pub simulate_calls: Mutex<Vec<(String, ChangeSet)>>,
    pub upload_replies: Mutex<VecDeque<Result<UploadReceipt, ApiError>>>,
    pub upload_calls: Mutex<Vec<UploadFile>>,
}

impl FakeBackend {
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        let fake = Self::default();
        *fake.employees.lock().unwrap() = employees;
        fake
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upload(&self, file: UploadFile) -> Result<UploadReceipt, ApiError> {
        self.upload_calls.lock().unwrap().push(file);
        self.upload_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(UploadReceipt::default()))
    }

    async fn summary(&self) -> Result<Summary, ApiError> {
        self.summary.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn employees(&self) -> Result<Vec<Employee>, ApiError> {
        Ok(self.employees.lock().unwrap().clone())
    }

    async fn employee(&self, id: &str) -> Result<Employee, ApiError> {
        if *self.employee_fails.lock().unwrap() {
            return Err(unavailable());
        }
        self.employees
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| ApiError::from_body(404, r#"{"detail":"Employee not found"}"#.to_string()))
    }

    async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, ApiError> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((message.to_string(), history.to_vec()));
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("re: {}", message)))
    }

    async fn simulate(
        &self,
        employee_id: &str,
        changes: &ChangeSet,
    ) -> Result<SimulationOutcome, ApiError> {
        self.simulate_calls
            .lock()
            .unwrap()
            .push((employee_id.to_string(), changes.clone()));
        self.simulate_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }
}
