//! Root shell: which view is showing and who needs to refetch.

use std::str::FromStr;

use retention_client::{RefreshBus, RefreshSubscription};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Employees,
    Upload,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Overview",
            View::Employees => "Employees",
            View::Upload => "Data Import",
        }
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "overview" => Ok(View::Dashboard),
            "employees" | "list" => Ok(View::Employees),
            "upload" | "import" => Ok(View::Upload),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

/// Explicit UI state owned by the host and passed to whatever renders it.
#[derive(Debug, Default)]
pub struct AppShell {
    view: View,
    selected_employee: Option<String>,
    refresh: RefreshBus,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Switching views also leaves any open employee detail.
    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.selected_employee = None;
    }

    pub fn selected_employee(&self) -> Option<&str> {
        self.selected_employee.as_deref()
    }

    pub fn open_employee(&mut self, id: impl Into<String>) {
        self.selected_employee = Some(id.into());
    }

    pub fn close_employee(&mut self) {
        self.selected_employee = None;
    }

    pub fn subscribe(&self) -> RefreshSubscription {
        self.refresh.subscribe()
    }

    pub fn refresh_generation(&self) -> u64 {
        self.refresh.generation()
    }

    /// Data changed on the backend: notify subscribers and land on the dashboard.
    pub fn on_upload_success(&mut self) -> u64 {
        let generation = self.refresh.publish();
        info!(generation, "Upload succeeded, refreshing views");
        self.set_view(View::Dashboard);
        generation
    }
}
