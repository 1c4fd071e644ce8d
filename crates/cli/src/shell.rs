//! Interactive shell: hosts the root shell state and every view.

use anyhow::Result;
use retention_client::{Backend, RefreshSubscription};
use retention_core::{Config, UploadFile};
use retention_views::{
    AppShell, CategoryFilter, ChatWidget, Dashboard, EmployeeDetail, EmployeeList, RoiCalculator,
    UploadView, View,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

use crate::terminal::{Osc52Clipboard, Terminal};

const HELP: &str = "\
Views:      dashboard | employees | upload <path>...
List:       search <text> | filter all|high-risk|critical | pick <id> | compare | clear
Employee:   open <id> | back
Simulator:  salary <pct> | promotion | remote | training | simulate
Email:      email | copy
Assistant:  ask <message> | chat
Dashboard:  roi <replacement-cost> <training-cost>
Other:      refresh | help | exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intervention {
    Promotion,
    RemoteWork,
    Training,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    Show(View),
    Refresh,
    Search(String),
    Filter(CategoryFilter),
    Pick(String),
    Compare,
    ClearSelection,
    Open(String),
    Back,
    Salary(f64),
    Toggle(Intervention),
    Simulate,
    Email,
    Copy,
    Ask(String),
    Transcript,
    Upload(Vec<PathBuf>),
    Roi { replacement_cost: f64, training_cost: f64 },
}

fn parse_amount(text: &str) -> Result<f64, String> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned
        .parse()
        .map_err(|_| format!("'{}' is not a number", text))
}

/// Parse one line of shell input.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let need = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {} {}", word, what))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "dashboard" | "overview" => ShellCommand::Show(View::Dashboard),
        "employees" | "list" => ShellCommand::Show(View::Employees),
        "upload" | "import" if rest.is_empty() => ShellCommand::Show(View::Upload),
        "upload" | "import" => {
            ShellCommand::Upload(rest.split_whitespace().map(PathBuf::from).collect())
        }
        "refresh" => ShellCommand::Refresh,
        "search" => ShellCommand::Search(rest.to_string()),
        "filter" => ShellCommand::Filter(match rest.to_ascii_lowercase().as_str() {
            "" | "all" => CategoryFilter::All,
            "high-risk" | "high" => CategoryFilter::HighRisk,
            "critical" => CategoryFilter::Critical,
            other => return Err(format!("unknown filter '{}'", other)),
        }),
        "pick" => ShellCommand::Pick(need("<id>")?),
        "compare" => ShellCommand::Compare,
        "clear" => ShellCommand::ClearSelection,
        "open" => ShellCommand::Open(need("<id>")?),
        "back" | "close" => ShellCommand::Back,
        "salary" => ShellCommand::Salary(parse_amount(&need("<percent>")?)?),
        "promotion" => ShellCommand::Toggle(Intervention::Promotion),
        "remote" => ShellCommand::Toggle(Intervention::RemoteWork),
        "training" => ShellCommand::Toggle(Intervention::Training),
        "simulate" | "sim" => ShellCommand::Simulate,
        "email" | "regen" => ShellCommand::Email,
        "copy" => ShellCommand::Copy,
        "ask" => ShellCommand::Ask(need("<message>")?),
        "chat" => ShellCommand::Transcript,
        "roi" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(r), Some(t)) => ShellCommand::Roi {
                    replacement_cost: parse_amount(r)?,
                    training_cost: parse_amount(t)?,
                },
                _ => return Err("usage: roi <replacement-cost> <training-cost>".to_string()),
            }
        }
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(command)
}

pub struct Shell<'a> {
    backend: &'a dyn Backend,
    terminal: Terminal,
    app: AppShell,
    refresh: RefreshSubscription,
    dashboard: Dashboard,
    list: EmployeeList,
    upload: UploadView,
    chat: ChatWidget,
    detail: Option<EmployeeDetail>,
}

impl<'a> Shell<'a> {
    pub fn new(backend: &'a dyn Backend, settings: &Config) -> Self {
        let app = AppShell::new();
        let refresh = app.subscribe();
        Self {
            backend,
            terminal: Terminal::new(),
            app,
            refresh,
            dashboard: Dashboard::new(RoiCalculator::new(
                settings.roi.replacement_cost,
                settings.roi.training_cost,
            )),
            list: EmployeeList::new(),
            upload: UploadView::new(),
            chat: ChatWidget::with_window(settings.chat.history_window),
            detail: None,
        }
    }

    pub async fn run(&mut self, api_url: &str) -> Result<()> {
        self.terminal.print_banner(api_url)?;
        self.reload().await;
        self.render()?;

        loop {
            let prompt = self.app.view().label().to_lowercase();
            let Some(line) = self.terminal.read_input(&prompt)? else {
                self.terminal.print_info("Goodbye.")?;
                break;
            };
            if line.is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(command) => {
                    debug!(?command, "Shell command");
                    self.execute(command).await?;
                }
                Err(message) => self.terminal.print_error(&message)?,
            }

            if let Some(generation) = self.refresh.poll_changed() {
                debug!(generation, "Refetching after data change");
                self.reload().await;
                self.render()?;
            }
        }
        Ok(())
    }

    async fn reload(&mut self) {
        self.dashboard.refresh(self.backend).await;
        self.list.refresh(self.backend).await;
    }

    fn render(&self) -> Result<()> {
        if let Some(detail) = &self.detail {
            return self.terminal.print_employee_detail(detail);
        }
        match self.app.view() {
            View::Dashboard => {
                if let Some(err) = self.dashboard.last_error() {
                    self.terminal.print_error(err)?;
                }
                self.terminal
                    .print_dashboard(&self.dashboard.model(), &self.dashboard.roi)
            }
            View::Employees => {
                if let Some(err) = self.list.last_error() {
                    self.terminal.print_error(err)?;
                }
                self.terminal
                    .print_employee_table(&self.list.visible(), self.list.selection())
            }
            View::Upload => {
                if let Some(err) = self.upload.last_error() {
                    self.terminal.print_error(err)?;
                }
                self.terminal
                    .print_info("Drop a CSV, Excel or PDF file with: upload <path>")
            }
        }
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<()> {
        match command {
            ShellCommand::Help => self.terminal.print_info(HELP)?,
            ShellCommand::Show(view) => {
                self.app.set_view(view);
                self.detail = None;
                self.render()?;
            }
            ShellCommand::Refresh => {
                self.reload().await;
                if let Some(detail) = self.detail.as_mut() {
                    detail.refresh(self.backend).await;
                }
                self.render()?;
            }
            ShellCommand::Search(text) => {
                self.list.set_search(text);
                self.show_list()?;
            }
            ShellCommand::Filter(category) => {
                self.list.set_category(category);
                self.show_list()?;
            }
            ShellCommand::Pick(id) => {
                if !self.list.toggle_compare(&id) {
                    self.terminal
                        .print_info("Two employees already picked; 'clear' or unpick one first.")?;
                }
                self.show_list()?;
            }
            ShellCommand::Compare => match self.list.comparison() {
                Some(view) => self.terminal.print_comparison(&view)?,
                None => self.terminal.print_info("Pick exactly two employees to compare.")?,
            },
            ShellCommand::ClearSelection => {
                self.list.clear_selection();
                self.show_list()?;
            }
            ShellCommand::Open(id) => {
                self.app.open_employee(id.clone());
                let mut detail = EmployeeDetail::new(id);
                detail.refresh(self.backend).await;
                self.detail = Some(detail);
                self.render()?;
            }
            ShellCommand::Back => {
                self.app.close_employee();
                self.detail = None;
                self.render()?;
            }
            ShellCommand::Salary(pct) => {
                if let Some(sim) = self.simulator()? {
                    sim.salary_change_pct = pct;
                }
                self.render_simulator()?;
            }
            ShellCommand::Toggle(which) => {
                if let Some(sim) = self.simulator()? {
                    let iv = &mut sim.interventions;
                    match which {
                        Intervention::Promotion => iv.promotion = !iv.promotion,
                        Intervention::RemoteWork => iv.remote_work = !iv.remote_work,
                        Intervention::Training => iv.training = !iv.training,
                    }
                }
                self.render_simulator()?;
            }
            ShellCommand::Simulate => {
                let backend = self.backend;
                if let Some(sim) = self.simulator()? {
                    sim.submit(backend).await;
                }
                self.render_simulator()?;
            }
            ShellCommand::Email => {
                let backend = self.backend;
                match self.detail.as_mut().and_then(|d| d.email_mut()) {
                    Some(email) => {
                        let spinner = self.terminal.start_spinner("Drafting")?;
                        let ok = email.generate(backend).await;
                        spinner.stop();
                        if !ok {
                            self.terminal.print_error("Failed to generate email.")?;
                        }
                        self.terminal.print_email(email, Instant::now())?;
                    }
                    None => self.terminal.print_info("Open an employee first: open <id>")?,
                }
            }
            ShellCommand::Copy => {
                match self.detail.as_mut().and_then(|d| d.email_mut()) {
                    Some(email) => {
                        let now = Instant::now();
                        if email.copy(&mut Osc52Clipboard, now)? {
                            self.terminal.print_email(email, now)?;
                        } else {
                            self.terminal.print_info("Nothing to copy yet; run 'email' first.")?;
                        }
                    }
                    None => self.terminal.print_info("Open an employee first: open <id>")?,
                }
            }
            ShellCommand::Ask(message) => {
                self.chat.open();
                self.chat.set_input(message);
                let spinner = self.terminal.start_spinner("Thinking")?;
                let sent = self.chat.send(self.backend).await;
                spinner.stop();
                if sent {
                    if let Some(reply) = self.chat.messages().last() {
                        self.terminal.print_chat_message(reply)?;
                    }
                }
            }
            ShellCommand::Transcript => {
                for message in self.chat.messages() {
                    self.terminal.print_chat_message(message)?;
                }
            }
            ShellCommand::Upload(paths) => self.upload_paths(paths).await?,
            ShellCommand::Roi {
                replacement_cost,
                training_cost,
            } => {
                self.dashboard.roi.replacement_cost = replacement_cost;
                self.dashboard.roi.training_cost = training_cost;
                self.app.set_view(View::Dashboard);
                self.detail = None;
                self.render()?;
            }
        }
        Ok(())
    }

    fn show_list(&mut self) -> Result<()> {
        if self.app.view() != View::Employees {
            self.app.set_view(View::Employees);
            self.detail = None;
        }
        self.render()
    }

    fn simulator(&mut self) -> Result<Option<&mut retention_views::Simulator>> {
        let Some(detail) = self.detail.as_mut() else {
            self.terminal.print_info("Open an employee first: open <id>")?;
            return Ok(None);
        };
        let sim = detail.simulator_mut();
        if sim.is_none() {
            self.terminal
                .print_info("No raw data for this employee; simulation unavailable.")?;
        }
        Ok(sim)
    }

    fn render_simulator(&self) -> Result<()> {
        match self.detail.as_ref().and_then(|d| d.simulator()) {
            Some(sim) => self.terminal.print_simulation(sim),
            None => Ok(()),
        }
    }

    async fn upload_paths(&mut self, paths: Vec<PathBuf>) -> Result<()> {
        // Same rule as a drag-and-drop: only the first file is sent.
        let mut files = Vec::new();
        for path in paths.iter().take(1) {
            match UploadFile::from_path(path) {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Rejected upload");
                    return self.terminal.print_error(&e.to_string());
                }
            }
        }
        if paths.len() > 1 {
            self.terminal
                .print_info(&format!("Only the first of {} files is imported.", paths.len()))?;
        }

        let spinner = self.terminal.start_spinner("Uploading")?;
        let mut message = None;
        let accepted = self
            .upload
            .drop_files(self.backend, files, |receipt| message = receipt.message.clone())
            .await;
        spinner.stop();

        if accepted {
            self.terminal
                .print_success(message.as_deref().unwrap_or("File processed successfully."))?;
            self.app.on_upload_success();
            self.detail = None;
        } else if let Some(err) = self.upload.last_error() {
            self.terminal.print_error(err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_views() {
        assert_eq!(parse_command("dashboard"), Ok(ShellCommand::Show(View::Dashboard)));
        assert_eq!(parse_command("  Employees "), Ok(ShellCommand::Show(View::Employees)));
        assert_eq!(parse_command("upload"), Ok(ShellCommand::Show(View::Upload)));
    }

    #[test]
    fn test_parse_upload_paths() {
        assert_eq!(
            parse_command("upload a.csv b.xlsx"),
            Ok(ShellCommand::Upload(vec![PathBuf::from("a.csv"), PathBuf::from("b.xlsx")]))
        );
    }

    #[test]
    fn test_parse_list_commands() {
        assert_eq!(parse_command("search ana"), Ok(ShellCommand::Search("ana".into())));
        assert_eq!(parse_command("search"), Ok(ShellCommand::Search(String::new())));
        assert_eq!(
            parse_command("filter high-risk"),
            Ok(ShellCommand::Filter(CategoryFilter::HighRisk))
        );
        assert!(parse_command("filter nobody").is_err());
        assert_eq!(parse_command("pick E1"), Ok(ShellCommand::Pick("E1".into())));
        assert!(parse_command("pick").is_err());
    }

    #[test]
    fn test_parse_simulator_and_roi() {
        assert_eq!(parse_command("salary 20"), Ok(ShellCommand::Salary(20.0)));
        assert!(parse_command("salary lots").is_err());
        assert_eq!(
            parse_command("remote"),
            Ok(ShellCommand::Toggle(Intervention::RemoteWork))
        );
        assert_eq!(
            parse_command("roi $45,000 6000"),
            Ok(ShellCommand::Roi {
                replacement_cost: 45_000.0,
                training_cost: 6_000.0
            })
        );
        assert!(parse_command("roi 1").is_err());
    }

    #[test]
    fn test_parse_ask_keeps_message() {
        assert_eq!(
            parse_command("ask Who is at risk in Sales?"),
            Ok(ShellCommand::Ask("Who is at risk in Sales?".into()))
        );
        assert!(parse_command("dance").is_err());
    }
}
