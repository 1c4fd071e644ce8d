use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use retention_client::HealthStatus;
use retention_core::{ChatMessage, ChatRole, Employee, RiskLabel};
use retention_views::compare::MetricRow;
use retention_views::dashboard::{DashboardModel, EMPTY_HINT, EMPTY_TITLE, NO_INSIGHTS};
use retention_views::list::NO_RECORDS;
use retention_views::roi::{format_currency, RoiCalculator};
use retention_views::simulator::{format_retention, projected_income};
use retention_views::{
    Clipboard, ComparisonView, CompareSelection, EmailGenerator, EmployeeDetail, Highlight,
    Simulator,
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::session::SessionSummary;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ASSISTANT_TEXT: Color = Color::Cyan;
    const BETTER: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
    const BAR: Color = Color::Blue;
    const RISK_HIGH: Color = Color::Red;
    const RISK_MEDIUM: Color = Color::Yellow;
    const RISK_LOW: Color = Color::Green;
}

const BAR_WIDTH: usize = 30;

fn risk_color(label: &RiskLabel) -> Color {
    match label {
        RiskLabel::High => Colors::RISK_HIGH,
        RiskLabel::Medium => Colors::RISK_MEDIUM,
        RiskLabel::Low => Colors::RISK_LOW,
        RiskLabel::Unknown(_) => Colors::DIM,
    }
}

/// Horizontal bar scaled against `max`; any non-zero value gets at least one cell.
pub fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cells = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

/// Cut to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Text cells of one employee table row: the leading columns before the
/// coloured risk label, then the risk label, then the trailing columns.
pub fn employee_row(e: &Employee, picked: bool) -> (String, String, String) {
    let marker = if picked { "[x]" } else { "[ ]" };
    let score = e
        .priority_score
        .map(|s| format!("{:.0}", s))
        .unwrap_or_else(|| "-".to_string());
    (
        format!(
            "{:<3}{:<10} {:<24} {:<18} ",
            marker,
            truncate(&e.id, 10),
            truncate(&e.name, 24),
            truncate(&e.department, 18)
        ),
        format!("{:<12} ", e.risk.label),
        format!("{:<10} {:<6}", e.impact.category, score),
    )
}

/// Body of the employee table: one line per row, or the placeholder row.
pub fn employee_table_body(rows: &[&Employee], selection: &CompareSelection) -> Vec<String> {
    if rows.is_empty() {
        return vec![NO_RECORDS.to_string()];
    }
    rows.iter()
        .map(|e| {
            let (lead, risk, tail) = employee_row(e, selection.contains(&e.id));
            format!("{}{}{}", lead, risk, tail)
        })
        .collect()
}

/// OSC 52 escape that asks the terminal to place `text` on the system clipboard.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

/// Clipboard backed by the hosting terminal emulator.
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    fn copy(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(osc52_sequence(text).as_bytes())?;
        stdout.flush()
    }
}

/// Manages terminal I/O for one-shot commands and the interactive shell.
#[derive(Debug, Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the shell startup banner.
    pub fn print_banner(&self, api_url: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("RetentionAI"),
            ResetColor,
            Print(" - Workforce attrition dashboard\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Backend: {}\n", api_url)),
            Print("Type 'help' for commands, 'exit' or 'quit' to end.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Read a line of user input with prompt.
    /// Returns None on end of input or when the user wants to exit.
    pub fn read_input(&self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::USER_PROMPT),
            Print(format!("{}> ", prompt)),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let trimmed = input.trim().to_string();

        if trimmed == "exit" || trimmed == "quit" || trimmed == "/exit" || trimmed == "/quit" {
            return Ok(None);
        }

        Ok(Some(trimmed))
    }

    fn print_heading(&self, title: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::HEADER),
            SetAttribute(Attribute::Bold),
            Print(format!("{}\n", title)),
            SetAttribute(Attribute::Reset),
            ResetColor,
        )?;
        Ok(())
    }

    /// KPIs, charts, insights and the ROI projection.
    pub fn print_dashboard(&self, model: &DashboardModel, roi: &RoiCalculator) -> Result<()> {
        let mut stdout = io::stdout();
        let data = match model {
            DashboardModel::Empty => {
                execute!(
                    stdout,
                    SetAttribute(Attribute::Bold),
                    Print(format!("{}\n", EMPTY_TITLE)),
                    SetAttribute(Attribute::Reset),
                    SetForegroundColor(Colors::DIM),
                    Print(format!("{}\n", EMPTY_HINT)),
                    ResetColor,
                )?;
                stdout.flush()?;
                return Ok(());
            }
            DashboardModel::Populated(data) => data,
        };

        self.print_heading("Overview")?;
        execute!(
            stdout,
            Print(format!(
                "{:<22}{:<22}{:<22}\n",
                "Total Employees", "High Risk", "Critical Talent"
            )),
            SetAttribute(Attribute::Bold),
            Print(format!("{:<22}", data.kpis.total_employees)),
            SetForegroundColor(Colors::RISK_HIGH),
            Print(format!("{:<22}", data.kpis.high_risk)),
            ResetColor,
            Print(format!("{:<22}\n", data.kpis.critical_talent)),
            SetAttribute(Attribute::Reset),
        )?;

        self.print_heading("Risk Distribution")?;
        for share in &data.risk_shares {
            let color = match share.tier {
                "High" => Colors::RISK_HIGH,
                "Medium" => Colors::RISK_MEDIUM,
                _ => Colors::RISK_LOW,
            };
            execute!(
                stdout,
                Print(format!("{:<8}", share.tier)),
                SetForegroundColor(color),
                Print(format!("{:<width$}", bar((share.fraction * 1000.0) as u64, 1000, BAR_WIDTH), width = BAR_WIDTH)),
                ResetColor,
                Print(format!(" {} ({:.0}%)\n", share.count, share.fraction * 100.0)),
            )?;
        }

        self.print_bars("High Risk by Department", &data.departments)?;
        self.print_bars("Top Risk Factors", &data.factors)?;

        self.print_heading("AI Insights")?;
        if data.insights.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print(format!("{}\n", NO_INSIGHTS)),
                ResetColor,
            )?;
        }
        for insight in &data.insights {
            execute!(stdout, Print(format!("  * {}\n", insight)))?;
        }

        self.print_roi(roi, data.kpis.high_risk)?;
        stdout.flush()?;
        Ok(())
    }

    fn print_bars(&self, title: &str, bars: &[retention_views::dashboard::Bar]) -> Result<()> {
        let mut stdout = io::stdout();
        self.print_heading(title)?;
        let max = bars.iter().map(|b| b.value).max().unwrap_or(0);
        for b in bars {
            execute!(
                stdout,
                Print(format!("{:<24}", truncate(&b.label, 22))),
                SetForegroundColor(Colors::BAR),
                Print(format!("{:<width$}", bar(b.value, max, BAR_WIDTH), width = BAR_WIDTH)),
                ResetColor,
                Print(format!(" {}\n", b.value)),
            )?;
        }
        Ok(())
    }

    fn print_roi(&self, roi: &RoiCalculator, high_risk: u64) -> Result<()> {
        let mut stdout = io::stdout();
        let projection = roi.project(high_risk);
        self.print_heading("Retention ROI Calculator")?;
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "Replacement cost ${}  |  Training cost ${}  |  Ramp-up {} months\n",
                format_currency(roi.replacement_cost),
                format_currency(roi.training_cost),
                roi.ramp_up_months
            )),
            ResetColor,
            Print(format!(
                "Total exposure ({} high-risk): ",
                projection.high_risk_count
            )),
            SetForegroundColor(Colors::RISK_HIGH),
            Print(format!("${}\n", format_currency(projection.total_exposure))),
            ResetColor,
            Print("Projected savings (40% success): "),
            SetForegroundColor(Colors::BETTER),
            Print(format!("${}\n", format_currency(projection.projected_savings))),
            ResetColor,
        )?;
        Ok(())
    }

    /// Employee table, with a marker on rows picked for comparison.
    pub fn print_employee_table(&self, rows: &[&Employee], selection: &CompareSelection) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "{:<3}{:<10} {:<24} {:<18} {:<12} {:<10} {:<6}\n",
                "", "ID", "NAME", "DEPARTMENT", "RISK", "IMPACT", "SCORE"
            )),
            Print(format!("{}\n", "-".repeat(88))),
            ResetColor,
        )?;

        if rows.is_empty() {
            let body = employee_table_body(rows, selection);
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print(format!("{}\n", body.join("\n"))),
                ResetColor,
            )?;
            stdout.flush()?;
            return Ok(());
        }

        for e in rows {
            let (lead, risk, tail) = employee_row(e, selection.contains(&e.id));
            execute!(
                stdout,
                Print(lead),
                SetForegroundColor(risk_color(&e.risk.label)),
                Print(risk),
                ResetColor,
                Print(format!("{}\n", tail)),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Risk narrative for one employee, plus any simulation or draft it holds.
    pub fn print_employee_detail(&self, detail: &EmployeeDetail) -> Result<()> {
        let mut stdout = io::stdout();
        if let Some(err) = detail.error() {
            return self.print_error(err);
        }
        let Some(e) = detail.employee() else {
            return self.print_info("Loading...");
        };

        execute!(
            stdout,
            SetAttribute(Attribute::Bold),
            Print(format!("{} ", e.name)),
            SetAttribute(Attribute::Reset),
            SetForegroundColor(Colors::DIM),
            Print(format!("({}, {})\n", e.id, e.department)),
            ResetColor,
            Print("Risk: "),
            SetForegroundColor(risk_color(&e.risk.label)),
            Print(format!("{}", e.risk.label)),
            ResetColor,
        )?;
        if let Some(p) = e.risk.probability {
            execute!(stdout, Print(format!(" ({:.0}% probability)", p * 100.0)))?;
        }
        execute!(
            stdout,
            Print(format!("\nImpact: {}", e.impact.category)),
        )?;
        if let Some(score) = e.priority_score {
            execute!(stdout, Print(format!("  |  Priority score: {:.0}", score)))?;
        }
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("\n{}\n", e.impact.explanation)),
            ResetColor,
        )?;

        self.print_heading("Key Risk Factors")?;
        for factor in &e.key_factors {
            execute!(stdout, Print(format!("  * {}\n", factor)))?;
        }
        self.print_heading("Recommended Actions")?;
        for action in &e.recommended_actions {
            execute!(stdout, Print(format!("  * {}\n", action)))?;
        }

        if let Some(sim) = detail.simulator() {
            self.print_simulation(sim)?;
        }
        if let Some(email) = detail.email() {
            if email.draft().is_some() {
                self.print_email(email, Instant::now())?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// Side-by-side metrics; the favourable side of each row is highlighted.
    pub fn print_comparison(&self, view: &ComparisonView) -> Result<()> {
        let mut stdout = io::stdout();
        let (a, b) = (view.first(), view.second());
        execute!(
            stdout,
            SetAttribute(Attribute::Bold),
            Print(format!("{:<22}{:<26}{:<26}\n", "", truncate(&a.name, 24), truncate(&b.name, 24))),
            SetAttribute(Attribute::Reset),
            Print(format!("{:<22}", "Risk")),
            SetForegroundColor(risk_color(&a.risk.label)),
            Print(format!("{:<26}", a.risk.label)),
            SetForegroundColor(risk_color(&b.risk.label)),
            Print(format!("{:<26}\n", b.risk.label)),
            ResetColor,
            Print(format!(
                "{:<22}{:<26}{:<26}\n",
                "Department",
                truncate(&a.department, 24),
                truncate(&b.department, 24)
            )),
        )?;

        for row in view.rows() {
            self.print_metric_row(row)?;
        }

        let factors = |e: &Employee| e.key_factors.first().cloned().unwrap_or_default();
        execute!(
            stdout,
            Print(format!(
                "{:<22}{:<26}{:<26}\n",
                "Top Factor",
                truncate(&factors(a), 24),
                truncate(&factors(b), 24)
            )),
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn print_metric_row(&self, row: &MetricRow) -> Result<()> {
        let mut stdout = io::stdout();
        let color_for = |side: Highlight| {
            if row.highlight == side {
                Colors::BETTER
            } else {
                Color::Reset
            }
        };
        execute!(
            stdout,
            Print(format!("{:<22}", row.label)),
            SetForegroundColor(color_for(Highlight::First)),
            Print(format!("{:<26}", row.display_first())),
            SetForegroundColor(color_for(Highlight::Second)),
            Print(format!("{:<26}\n", row.display_second())),
            ResetColor,
        )?;
        Ok(())
    }

    /// Simulator inputs and, once run, the before/after risk.
    pub fn print_simulation(&self, sim: &Simulator) -> Result<()> {
        let mut stdout = io::stdout();
        self.print_heading("What-If Simulator")?;
        let iv = sim.interventions;
        let flag = |on: bool| if on { "yes" } else { "no" };
        execute!(
            stdout,
            Print(format!(
                "Salary change: {:+.0}% (${} / month)\n",
                sim.salary_change_pct,
                format_currency(projected_income(sim.base_income(), sim.salary_change_pct))
            )),
            Print(format!(
                "Promotion: {}  |  Remote work: {}  |  Training: {}\n",
                flag(iv.promotion),
                flag(iv.remote_work),
                flag(iv.training)
            )),
        )?;

        if let Some(err) = sim.error() {
            return self.print_error(err);
        }
        if let Some(result) = sim.result() {
            execute!(
                stdout,
                Print("Current risk: "),
                SetForegroundColor(risk_color(&result.original_risk)),
                Print(format!("{}", result.original_risk)),
                ResetColor,
                Print("  ->  Projected risk: "),
                SetForegroundColor(risk_color(&result.new_risk)),
                Print(format!("{}", result.new_risk)),
                ResetColor,
                Print("\nRetention probability: "),
                SetAttribute(Attribute::Bold),
                Print(format!("{}\n", format_retention(result.new_probability))),
                SetAttribute(Attribute::Reset),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_email(&self, email: &EmailGenerator, now: Instant) -> Result<()> {
        let mut stdout = io::stdout();
        self.print_heading("Retention Email Draft")?;
        match email.draft() {
            Some(draft) => execute!(stdout, Print(format!("{}\n", draft)))?,
            None => execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No draft yet.\n"),
                ResetColor,
            )?,
        }
        if email.is_copied(now) {
            execute!(
                stdout,
                SetForegroundColor(Colors::BETTER),
                Print("Copied!\n"),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_chat_message(&self, message: &ChatMessage) -> Result<()> {
        let mut stdout = io::stdout();
        let (label, color) = match message.role {
            ChatRole::User => ("you", Colors::USER_PROMPT),
            ChatRole::Assistant => ("ai", Colors::ASSISTANT_TEXT),
        };
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(format!("{}: ", label)),
            ResetColor,
            Print(format!("{}\n", message.content)),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print a saved transcript listing.
    pub fn print_sessions(&self, sessions: &[SessionSummary]) -> Result<()> {
        let mut stdout = io::stdout();
        if sessions.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("No saved transcripts found.\n"),
                ResetColor,
            )?;
            return Ok(());
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("Saved Transcripts:\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("{:<34} {:<40} {:<6}\n", "ID", "NAME", "MSGS")),
            Print(format!("{}\n", "-".repeat(80))),
            ResetColor,
        )?;
        for s in sessions {
            execute!(
                stdout,
                Print(format!(
                    "{:<34} {:<40} {:<6}\n",
                    s.id,
                    truncate(&s.name, 38),
                    s.message_count
                )),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_health(&self, api_url: &str, health: &HealthStatus) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::BETTER),
            Print(format!("{} ", health.status)),
            ResetColor,
            Print(format!(
                "{} at {}\n",
                health.service.as_deref().unwrap_or("backend"),
                api_url
            )),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show a spinner/waiting indicator. Returns a handle to stop it.
    pub fn start_spinner(&self, message: &str) -> Result<SpinnerHandle> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{} ", message)),
            ResetColor,
        )?;
        stdout.flush()?;

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = std::thread::spawn(move || {
            let frames = ['|', '/', '-', '\\'];
            let mut i = 0;
            while running_clone.load(Ordering::SeqCst) {
                let mut stdout = io::stdout();
                execute!(
                    stdout,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("\r{} ", frames[i % frames.len()])),
                    ResetColor,
                )
                .ok();
                stdout.flush().ok();
                i += 1;
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            let mut stdout = io::stdout();
            execute!(stdout, Print("\r  \r")).ok();
            stdout.flush().ok();
        });

        Ok(SpinnerHandle {
            running,
            thread: Some(handle),
        })
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_success(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::BETTER),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Handle to a running spinner. Drop or call stop() to terminate it.
pub struct SpinnerHandle {
    running: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SpinnerHandle {
    /// Stop the spinner and wait for the line to be cleared.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
