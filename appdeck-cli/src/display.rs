//! Terminal and HTML presentation shared by `run` and `list`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use appdeck_core::{AppRoot, Registry};
use appdeck_launcher::{AppStatus, ResolvedAddress, RunReport};
use appdeck_renderer::{context::DEFAULT_TITLE, DashboardContext, DashboardRenderer};

#[derive(Tabled)]
struct AppTableRow {
    #[tabled(rename = "app")]
    root: String,
    #[tabled(rename = "url")]
    url: String,
    #[tabled(rename = "port")]
    port: u16,
    #[tabled(rename = "pid")]
    process_id: u32,
    #[tabled(rename = "status")]
    status: String,
}

pub fn status_label(status: &AppStatus) -> &'static str {
    match status {
        AppStatus::AlreadyRunning => "already running",
        AppStatus::Launched { .. } => "launched",
        AppStatus::Relaunched { .. } => "relaunched",
        AppStatus::WouldLaunch => "would launch",
        AppStatus::Failed { .. } => "failed",
    }
}

pub fn statuses(report: &RunReport) -> BTreeMap<AppRoot, String> {
    report
        .outcomes
        .iter()
        .map(|o| (o.root.clone(), status_label(&o.status).to_string()))
        .collect()
}

fn notice_text(root: &AppRoot, status: &AppStatus) -> String {
    match status {
        AppStatus::AlreadyRunning => format!("App {root} is already running."),
        AppStatus::Launched { port, process_id } => {
            format!("Started {root} on port {port} (pid {process_id}).")
        }
        AppStatus::Relaunched {
            port,
            process_id,
            previous_process_id,
        } => format!(
            "Restarted {root} on port {port} (pid {process_id}, was {previous_process_id})."
        ),
        AppStatus::WouldLaunch => format!("Would start {root}."),
        AppStatus::Failed { reason } => format!("Failed to start {root}: {reason}"),
    }
}

fn address_line(address: &ResolvedAddress) -> String {
    match &address.fallback_reason {
        None => format!("Address: {}", address.ip),
        Some(reason) => format!(
            "Could not determine the local network address ({reason}); using {}.",
            address.ip
        ),
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

pub fn print_title() {
    println!("{}", DEFAULT_TITLE.bold());
}

pub fn print_address(address: &ResolvedAddress) {
    let line = address_line(address);
    if address.is_fallback() {
        println!("{}", line.yellow());
    } else {
        println!("{line}");
    }
}

pub fn print_report(report: &RunReport) {
    print_title();
    print_address(&report.address);

    for outcome in &report.outcomes {
        let text = notice_text(&outcome.root, &outcome.status);
        match outcome.status {
            AppStatus::AlreadyRunning => println!("{} {text}", "ℹ".blue().bold()),
            AppStatus::Failed { .. } => println!("{} {}", "✗".red().bold(), text.red()),
            AppStatus::WouldLaunch => println!("{} {text}", "○".bright_black().bold()),
            _ => println!("{} {text}", "✓".green().bold()),
        }
    }
    for skipped in &report.skipped {
        println!(
            "{} {}",
            "!".yellow().bold(),
            format!("Skipped {}: {}", skipped.path.display(), skipped.reason).yellow()
        );
    }

    print_registry_table(&report.registry, &statuses(report));

    let launched = report.count(|s| {
        matches!(s, AppStatus::Launched { .. } | AppStatus::Relaunched { .. })
    });
    let failed = report.count(|s| matches!(s, AppStatus::Failed { .. }));
    let summary = format!(
        "{} apps found | {} started | {} failed | registry {}",
        report.outcomes.len(),
        launched,
        failed,
        report.registry_path.display()
    );
    println!("{}", summary.bright_black());
    if report.dry_run {
        println!("Dry run: nothing was started or saved.");
    }
}

pub fn print_registry_table(registry: &Registry, statuses: &BTreeMap<AppRoot, String>) {
    if registry.is_empty() {
        println!("No apps registered.");
        return;
    }
    let rows: Vec<AppTableRow> = registry
        .iter()
        .map(|(root, entry)| AppTableRow {
            root: root.to_string(),
            url: entry.url.clone(),
            port: entry.port,
            process_id: entry.process_id,
            status: statuses.get(root).cloned().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

pub fn write_dashboard(
    ctx: DashboardContext,
    out: &Path,
    template_dir: Option<&Path>,
) -> Result<()> {
    let renderer = DashboardRenderer::with_templates(template_dir)
        .context("failed to load dashboard template")?;
    renderer
        .render_to(&ctx, out)
        .with_context(|| format!("failed to write dashboard to {}", out.display()))?;
    tracing::info!(path = %out.display(), "dashboard written");
    Ok(())
}

pub fn report_dashboard(report: &RunReport) -> DashboardContext {
    let mut ctx = DashboardContext::from_registry(&report.registry, report.address.ip.to_string())
        .with_address_notice(report.address.fallback_reason.clone())
        .with_statuses(&statuses(report));
    for outcome in &report.outcomes {
        let warn = matches!(outcome.status, AppStatus::Failed { .. });
        ctx.push_notice(notice_text(&outcome.root, &outcome.status), warn);
    }
    ctx
}
