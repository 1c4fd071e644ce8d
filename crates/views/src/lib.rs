//! Interaction logic for the attrition dashboard.
//!
//! Each view owns its own fetched snapshot and talks to the backend only
//! through [`retention_client::Backend`]; a failure in one view never touches
//! another.

pub mod chat;
pub mod compare;
pub mod dashboard;
pub mod detail;
pub mod email;
pub mod list;
pub mod roi;
pub mod shell;
pub mod simulator;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::ChatWidget;
pub use compare::{ComparisonView, Highlight};
pub use dashboard::{Dashboard, DashboardModel};
pub use detail::EmployeeDetail;
pub use email::{Clipboard, EmailGenerator};
pub use list::{CategoryFilter, CompareSelection, EmployeeList};
pub use roi::RoiCalculator;
pub use shell::{AppShell, View};
pub use simulator::Simulator;
pub use upload::UploadView;
