//! Employee list: search, category filter and the two-slot compare tray.

use retention_client::{ApiError, Backend, Fence, Ticket};
use retention_core::Employee;
use tracing::{debug, error, warn};

use crate::compare::ComparisonView;

pub const NO_RECORDS: &str = "No records found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    HighRisk,
    Critical,
}

impl CategoryFilter {
    pub const ALL: [CategoryFilter; 3] = [
        CategoryFilter::All,
        CategoryFilter::HighRisk,
        CategoryFilter::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::HighRisk => "High Risk",
            CategoryFilter::Critical => "Critical",
        }
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::HighRisk => employee.risk.label.is_high(),
            CategoryFilter::Critical => employee.impact.category.is_critical(),
        }
    }
}

/// Employees matching both the search text and the category.
pub fn filter_employees<'a>(
    employees: &'a [Employee],
    search: &str,
    category: CategoryFilter,
) -> Vec<&'a Employee> {
    let needle = search.to_lowercase();
    employees
        .iter()
        .filter(|e| e.matches_search(&needle) && category.matches(e))
        .collect()
}

/// Up to two employee ids picked for side-by-side comparison, in pick order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareSelection {
    ids: Vec<String>,
}

impl CompareSelection {
    pub const MAX: usize = 2;

    /// Add `id` if absent and there is room, remove it if present.
    /// A third pick is ignored. Returns whether the selection changed.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|x| x == id) {
            self.ids.remove(pos);
            return true;
        }
        if self.ids.len() >= Self::MAX {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Comparison needs exactly two picks.
    pub fn is_ready(&self) -> bool {
        self.ids.len() == Self::MAX
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// State behind the employee table.
#[derive(Debug, Default)]
pub struct EmployeeList {
    employees: Vec<Employee>,
    search: String,
    category: CategoryFilter,
    selection: CompareSelection,
    showing_compare: bool,
    loading: bool,
    last_error: Option<String>,
    fence: Fence,
}

impl EmployeeList {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last fetch failure. The table keeps its previous rows.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn visible(&self) -> Vec<&Employee> {
        filter_employees(&self.employees, &self.search, self.category)
    }

    pub fn selection(&self) -> &CompareSelection {
        &self.selection
    }

    pub fn toggle_compare(&mut self, id: &str) -> bool {
        let changed = self.selection.toggle(id);
        if !changed {
            debug!(id, "Compare tray full, ignoring pick");
        }
        changed
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.showing_compare = false;
    }

    pub fn can_compare(&self) -> bool {
        self.selection.is_ready()
    }

    /// Records for the two picks, in pick order. `None` unless exactly two
    /// are selected and both are still in the collection.
    pub fn comparison(&self) -> Option<ComparisonView> {
        if !self.selection.is_ready() {
            return None;
        }
        let find = |id: &String| self.employees.iter().find(|e| &e.id == id).cloned();
        let first = find(&self.selection.ids()[0])?;
        let second = find(&self.selection.ids()[1])?;
        Some(ComparisonView::new(first, second))
    }

    /// Open the side-by-side view. No-op unless comparison is enabled.
    pub fn open_compare(&mut self) -> bool {
        self.showing_compare = self.can_compare();
        self.showing_compare
    }

    pub fn close_compare(&mut self) {
        self.showing_compare = false;
    }

    pub fn is_showing_compare(&self) -> bool {
        self.showing_compare
    }

    /// Start a refetch. Any response for an earlier ticket will be dropped.
    pub fn begin_refresh(&mut self) -> Ticket {
        self.fence.issue()
    }

    /// Apply a fetch result. Returns `false` when the ticket was superseded.
    pub fn apply(&mut self, ticket: Ticket, result: Result<Vec<Employee>, ApiError>) -> bool {
        if !self.fence.is_current(ticket) {
            warn!(?ticket, "Discarding stale employee list response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(employees) => {
                debug!(count = employees.len(), "Employee list loaded");
                self.employees = employees;
                self.last_error = None;
            }
            Err(e) => {
                error!(error = %e, "Failed to load employees");
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    pub async fn refresh(&mut self, backend: &dyn Backend) {
        let ticket = self.begin_refresh();
        let result = backend.employees().await;
        self.apply(ticket, result);
    }
}
