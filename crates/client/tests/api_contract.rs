//! Exercises `ApiClient` against an in-process axum stub of the backend.

use std::net::SocketAddr;

use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use retention_client::{ApiClient, ApiError, Backend};
use retention_core::{ChangeSet, ChatMessage, SimulationOutcome, UploadFile};
use serde_json::{json, Value};

async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(&format!("http://{}/api/v1", addr)).unwrap()
}

fn employee_json(id: &str) -> Value {
    json!({
        "EmployeeID": id,
        "Name": format!("Employee {}", id),
        "Department": "Sales",
        "Risk": {"Label": "High Risk", "Probability": 0.7},
        "Impact": {"category": "Critical", "explanation": "High value."},
        "PriorityScore": 70.0,
        "KeyFactors": ["Overtime: frequent"],
        "RecommendedActions": ["Schedule check-in meeting to discuss career path."],
        "RawData": {"MonthlyIncome": 5000, "TotalWorkingYears": 8, "YearsAtCompany": 3}
    })
}

fn stub_router() -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({"status": "ok", "service": "HR Analytics Backend"})) }))
        .route(
            "/api/v1/dashboard/summary",
            get(|| async {
                Json(json!({
                    "total_employees": 2,
                    "risk_breakdown": {"High": 1, "Medium": 1, "Low": 0},
                    "critical_talent": 1,
                    "department_risk": {"Sales": 1},
                    "top_risk_factors": [["Overtime: frequent", 2]],
                    "insights": ["1 employees (50%) are identified as High Risk."]
                }))
            }),
        )
        .route(
            "/api/v1/employees",
            get(|| async { Json(json!([employee_json("E1"), employee_json("E2")])) }),
        )
        .route(
            "/api/v1/employees/{id}",
            get(|Path(id): Path<String>| async move {
                if id == "missing" {
                    Err((StatusCode::NOT_FOUND, Json(json!({"detail": "Employee not found"}))))
                } else {
                    Ok(Json(employee_json(&id)))
                }
            }),
        )
        .route(
            "/api/v1/upload",
            post(|mut multipart: Multipart| async move {
                let field = multipart.next_field().await.unwrap().unwrap();
                let name = field.name().unwrap_or_default().to_string();
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap();
                if file_name.ends_with(".pdf") {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "PDF Upload Detected. Please convert your PDF data to Excel (XLSX) or CSV format for analysis."})),
                    ));
                }
                Ok(Json(json!({
                    "message": format!("{}:{}:{}", name, file_name, content_type),
                    "count": bytes.len()
                })))
            }),
        )
        .route(
            "/api/v1/chat",
            post(|Json(body): Json<Value>| async move {
                let message = body["message"].as_str().unwrap_or_default().to_string();
                if message == "boom" {
                    return Json(json!({"error": "LLM unavailable"}));
                }
                let history = body["history"].as_array().map(|h| h.len()).unwrap_or(0);
                Json(json!({"response": format!("echo {} ({} prior)", message, history)}))
            }),
        )
        .route(
            "/api/v1/simulate",
            post(|Json(body): Json<Value>| async move {
                if body["employee_id"] == "norawdata" {
                    return Json(json!({"error": "Raw data not available for simulation."}));
                }
                let income = body["changes"]["MonthlyIncome"].as_f64().unwrap_or_default();
                Json(json!({
                    "original_risk": "High Risk",
                    "original_probability": 0.7,
                    "new_risk": if income >= 6000.0 { "Medium Risk" } else { "High Risk" },
                    "new_probability": 0.35,
                    "changes_applied": body["changes"].clone(),
                    "factors_considered": ["Salary +20%"]
                }))
            }),
        )
}

#[tokio::test]
async fn test_summary_and_employees() {
    let client = client_for(spawn_stub(stub_router()).await);

    let summary = client.summary().await.unwrap();
    assert_eq!(summary.total_employees, 2);
    assert_eq!(summary.department_risk.get("Sales"), Some(&1));

    let employees = client.employees().await.unwrap();
    let ids: Vec<_> = employees.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["E1", "E2"]);

    let one = client.employee("E2").await.unwrap();
    assert_eq!(one.name, "Employee E2");
}

#[tokio::test]
async fn test_employee_not_found_carries_detail() {
    let client = client_for(spawn_stub(stub_router()).await);
    let err = client.employee("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail(), Some("Employee not found"));
}

#[tokio::test]
async fn test_upload_sends_file_field() {
    let client = client_for(spawn_stub(stub_router()).await);
    let file = UploadFile::new("staff.csv", b"EmployeeID,Name\n1,Ada\n".to_vec()).unwrap();
    let receipt = client.upload(file).await.unwrap();
    assert_eq!(receipt.message.as_deref(), Some("file:staff.csv:text/csv"));
    assert_eq!(receipt.count, Some(22));
}

#[tokio::test]
async fn test_upload_failure_exposes_backend_detail() {
    let client = client_for(spawn_stub(stub_router()).await);
    let file = UploadFile::new("report.pdf", b"%PDF-1.4".to_vec()).unwrap();
    let err = client.upload(file).await.unwrap_err();
    assert!(err.detail().unwrap().starts_with("PDF Upload Detected"));
}

#[tokio::test]
async fn test_chat_round_trip_and_in_band_error() {
    let client = client_for(spawn_stub(stub_router()).await);
    let history = vec![ChatMessage::assistant("Hello!"), ChatMessage::user("hi")];
    let reply = client.chat("trends?", &history).await.unwrap();
    assert_eq!(reply, "echo trends? (2 prior)");

    let err = client.chat("boom", &[]).await.unwrap_err();
    assert_eq!(err.detail(), Some("LLM unavailable"));
}

#[tokio::test]
async fn test_simulate_outcomes() {
    let client = client_for(spawn_stub(stub_router()).await);
    let changes = ChangeSet {
        monthly_income: 6000.0,
        promotion: true,
        remote_work: false,
        training: false,
    };

    match client.simulate("E1", &changes).await.unwrap() {
        SimulationOutcome::Completed(result) => {
            assert_eq!(result.new_risk.as_str(), "Medium Risk");
            assert_eq!(result.changes_applied.unwrap()["Promotion"], true);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    assert_eq!(
        client.simulate("norawdata", &changes).await.unwrap(),
        SimulationOutcome::Rejected {
            error: "Raw data not available for simulation.".into()
        }
    );
}

#[tokio::test]
async fn test_health_hits_service_root() {
    let client = client_for(spawn_stub(stub_router()).await);
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let err = client.summary().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.detail().is_none());
    assert!(!err.describe_or("fallback").is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let router = Router::new().route("/api/v1/employees", get(|| async { "not json" }));
    let client = client_for(spawn_stub(router).await);
    assert!(matches!(client.employees().await, Err(ApiError::Parse(_))));
}
