use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use retention_views::CategoryFilter;

/// Terminal front end for the employee attrition-risk service.
///
/// Shows the workforce summary, lists and compares employees, runs
/// what-if retention simulations and drafts outreach emails.
#[derive(Parser, Debug)]
#[command(name = "retention", about = "Employee attrition-risk dashboard in the terminal")]
pub struct CliArgs {
    /// Backend API base URL (overrides env var and config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to config file (default: ~/.config/retention-cli/config.toml)
    #[arg(long, global = true, env = "RETENTION_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// KPIs, risk distribution, department and factor charts, ROI projection
    Dashboard {
        /// Cost to replace one employee
        #[arg(long)]
        replacement_cost: Option<f64>,
        /// Onboarding and training cost per hire
        #[arg(long)]
        training_cost: Option<f64>,
    },
    /// List employees, optionally filtered
    Employees {
        /// Case-insensitive match on name, department or ID
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Show one employee's risk narrative
    Employee { id: String },
    /// Side-by-side comparison of two employees
    Compare { first: String, second: String },
    /// What-if retention simulation for one employee
    Simulate {
        id: String,
        /// Salary change in percent, e.g. 20 for a 20% raise
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        salary_change: f64,
        #[arg(long)]
        promotion: bool,
        #[arg(long)]
        remote_work: bool,
        #[arg(long)]
        training: bool,
    },
    /// Draft a retention email for one employee
    Email {
        id: String,
        /// Copy the draft to the terminal clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Import a CSV, Excel or PDF file (only the first file is sent)
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Talk to the workforce assistant
    Chat {
        /// Resume a saved transcript by ID prefix
        #[arg(long)]
        resume: Option<String>,
        /// List saved transcripts
        #[arg(long)]
        list: bool,
    },
    /// Interactive shell hosting every view
    Shell,
    /// Check that the backend is reachable
    Health,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    All,
    HighRisk,
    Critical,
}

impl From<FilterArg> for CategoryFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => CategoryFilter::All,
            FilterArg::HighRisk => CategoryFilter::HighRisk,
            FilterArg::Critical => CategoryFilter::Critical,
        }
    }
}
