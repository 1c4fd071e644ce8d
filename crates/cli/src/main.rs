mod cli;
mod config;
mod session;
mod shell;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

use retention_client::ApiClient;
use retention_core::{Config, UploadFile};
use retention_views::{
    ChatWidget, Dashboard, EmployeeDetail, EmployeeList, RoiCalculator, UploadView,
};

use crate::cli::{CliArgs, Command};
use crate::config::CliConfig;
use crate::session::ChatSession;
use crate::shell::Shell;
use crate::terminal::{Osc52Clipboard, Terminal};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    retention_core::config::load_dotenv();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let file_config =
        CliConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let settings = file_config.resolve(Config::from_env(), args.api_url.as_deref());
    settings.log_summary();

    let client = ApiClient::from_config(&settings.api)
        .with_context(|| format!("invalid API base URL '{}'", settings.api.base_url))?;

    let command = args.command.unwrap_or(Command::Shell);
    if let Err(e) = run(command, &client, &settings, &terminal).await {
        error!(error = %e, "Command failed");
        terminal.print_error(&format!("{:#}", e))?;
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, client: &ApiClient, settings: &Config, terminal: &Terminal) -> Result<()> {
    match command {
        Command::Dashboard {
            replacement_cost,
            training_cost,
        } => {
            let roi = RoiCalculator::new(
                replacement_cost.unwrap_or(settings.roi.replacement_cost),
                training_cost.unwrap_or(settings.roi.training_cost),
            );
            let mut dashboard = Dashboard::new(roi);
            dashboard.refresh(client).await;
            if let Some(err) = dashboard.last_error() {
                anyhow::bail!("failed to load dashboard summary: {}", err);
            }
            terminal.print_dashboard(&dashboard.model(), &dashboard.roi)?;
        }
        Command::Employees { search, filter } => {
            let mut list = EmployeeList::new();
            list.refresh(client).await;
            if let Some(err) = list.last_error() {
                anyhow::bail!("failed to load employees: {}", err);
            }
            list.set_search(search);
            list.set_category(filter.into());
            terminal.print_employee_table(&list.visible(), list.selection())?;
        }
        Command::Employee { id } => {
            let detail = load_detail(client, &id).await?;
            terminal.print_employee_detail(&detail)?;
        }
        Command::Compare { first, second } => {
            let mut list = EmployeeList::new();
            list.refresh(client).await;
            if let Some(err) = list.last_error() {
                anyhow::bail!("failed to load employees: {}", err);
            }
            for id in [&first, &second] {
                if !list.employees().iter().any(|e| &e.id == id) {
                    anyhow::bail!("no employee with ID '{}'", id);
                }
                list.toggle_compare(id);
            }
            let view = list
                .comparison()
                .context("pick two different employees to compare")?;
            terminal.print_comparison(&view)?;
        }
        Command::Simulate {
            id,
            salary_change,
            promotion,
            remote_work,
            training,
        } => {
            let mut detail = load_detail(client, &id).await?;
            let sim = detail
                .simulator_mut()
                .context("employee has no raw data; simulation unavailable")?;
            sim.salary_change_pct = salary_change;
            sim.interventions.promotion = promotion;
            sim.interventions.remote_work = remote_work;
            sim.interventions.training = training;
            let spinner = terminal.start_spinner("Simulating")?;
            sim.submit(client).await;
            spinner.stop();
            terminal.print_simulation(sim)?;
        }
        Command::Email { id, copy } => {
            let mut detail = load_detail(client, &id).await?;
            let email = detail
                .email_mut()
                .context("employee record did not load")?;
            let spinner = terminal.start_spinner("Drafting")?;
            let ok = email.generate(client).await;
            spinner.stop();
            if !ok {
                anyhow::bail!("failed to generate email");
            }
            let now = Instant::now();
            if copy {
                email
                    .copy(&mut Osc52Clipboard, now)
                    .context("failed to write to terminal clipboard")?;
            }
            terminal.print_email(email, now)?;
        }
        Command::Upload { paths } => upload(client, terminal, &paths).await?,
        Command::Chat { resume, list } => {
            let dir = CliConfig::transcripts_dir()?;
            if list {
                terminal.print_sessions(&ChatSession::list_all(&dir)?)?;
                return Ok(());
            }
            chat_repl(client, settings, terminal, &dir, resume.as_deref()).await?;
        }
        Command::Shell => {
            let mut shell = Shell::new(client, settings);
            shell.run(client.base_url()).await?;
        }
        Command::Health => {
            let health = client
                .health()
                .await
                .with_context(|| format!("backend not reachable at {}", client.base_url()))?;
            terminal.print_health(client.base_url(), &health)?;
        }
    }
    Ok(())
}

async fn load_detail(client: &ApiClient, id: &str) -> Result<EmployeeDetail> {
    let mut detail = EmployeeDetail::new(id);
    detail.refresh(client).await;
    if let Some(err) = detail.error() {
        anyhow::bail!("{}", err);
    }
    Ok(detail)
}

async fn upload(client: &ApiClient, terminal: &Terminal, paths: &[PathBuf]) -> Result<()> {
    let Some(first) = paths.first() else {
        return Ok(());
    };
    if paths.len() > 1 {
        warn!(dropped = paths.len() - 1, "Only the first file is imported");
        terminal.print_info(&format!("Only the first of {} files is imported.", paths.len()))?;
    }
    let file = UploadFile::from_path(first)
        .with_context(|| format!("cannot import {}", first.display()))?;

    let mut view = UploadView::new();
    let mut message = None;
    let spinner = terminal.start_spinner("Uploading")?;
    let accepted = view
        .drop_files(client, vec![file], |receipt| message = receipt.message.clone())
        .await;
    spinner.stop();

    if !accepted {
        anyhow::bail!("{}", view.last_error().unwrap_or("upload failed"));
    }
    terminal.print_success(message.as_deref().unwrap_or("File processed successfully."))?;
    Ok(())
}

async fn chat_repl(
    client: &ApiClient,
    settings: &Config,
    terminal: &Terminal,
    dir: &std::path::Path,
    resume: Option<&str>,
) -> Result<()> {
    let mut session = match resume {
        Some(id) => {
            let loaded = ChatSession::load(dir, id)
                .with_context(|| format!("failed to load transcript '{}'", id))?;
            terminal.print_info(&format!(
                "Resumed transcript: {} ({} messages)",
                loaded.name,
                loaded.messages.len()
            ))?;
            loaded
        }
        None => ChatSession::new(client.base_url()),
    };

    let mut chat = ChatWidget::resume(settings.chat.history_window, session.messages.clone());
    chat.open();
    for message in chat.messages() {
        terminal.print_chat_message(message)?;
    }

    while let Some(input) = terminal.read_input("you")? {
        if input.is_empty() {
            continue;
        }
        chat.set_input(input);
        let spinner = terminal.start_spinner("Thinking")?;
        let sent = chat.send(client).await;
        spinner.stop();
        if !sent {
            continue;
        }
        if let Some(reply) = chat.messages().last() {
            terminal.print_chat_message(reply)?;
        }

        session.messages = chat.messages().to_vec();
        session.update_name_from_first_message();
        if let Err(e) = session.save(dir) {
            warn!(error = %e, "Failed to auto-save transcript");
        }
    }

    session.messages = chat.messages().to_vec();
    session.update_name_from_first_message();
    match session.save(dir) {
        Ok(path) => {
            info!(path = %path.display(), "Transcript saved");
            terminal.print_info(&format!("Transcript saved: {}", session.id))?;
        }
        Err(e) => terminal.print_error(&format!("Failed to save transcript: {}", e))?,
    }
    Ok(())
}
