//! # marcaje — scheduled time-clock bot
//!
//! One invocation is one run: check the kill switch, check the holiday
//! calendar, resolve the enabled identifiers from the flag backend, then
//! dispatch one sign-in/out per identifier with randomized delays and email
//! each outcome.
//!
//! Usage:
//!   marcaje                         # normal run (~/.marcaje/config.toml)
//!   marcaje --config ./dev.toml     # explicit config
//!   marcaje --debug                 # no delays, simulated form actions
//!
//! Exit status is 0 on every normal completion — including the holiday and
//! "nothing to do" short-circuits — unless `dispatch.fail_on_partial` is set,
//! in which case any failed item exits 1.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use marcaje_calendar::{CalendarGate, GateDecision};
use marcaje_clock::{site_offset, webdriver_clock};
use marcaje_core::{IdentifierSource, MarcajeConfig, Notifier};
use marcaje_dispatch::{WorkDispatcher, report};
use marcaje_flags::FlagBackend;
use marcaje_notify::Mailer;

#[derive(Parser)]
#[command(name = "marcaje", version, about = "⏱️ marcaje — scheduled time-clock bot")]
struct Cli {
    /// Config file path (default: ~/.marcaje/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Debug mode: skip delays, simulate the form interaction
    #[arg(long)]
    debug: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    tracing::info!("🚀 Starting marcaje run");

    // Config errors are the only fatal category — nothing has run yet.
    let mut config = match &cli.config {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            let mut config = MarcajeConfig::load_from(Path::new(&path))?;
            config.apply_env_overrides();
            config
        }
        None => MarcajeConfig::load()?,
    };
    if cli.debug {
        config.dispatch.debug_mode = true;
    }
    config.validate()?;

    if !config.dispatch.clock_in_active {
        tracing::info!("⏹️ Kill switch is off (clock_in_active = false), nothing to do");
        return Ok(());
    }

    let notifier: Arc<dyn Notifier> = Arc::new(Mailer::new(config.email.clone()));

    // Calendar gate.
    let today = chrono::Utc::now()
        .with_timezone(&site_offset(&config.clock))
        .date_naive();
    let gate = CalendarGate::new(&config.calendar);
    match gate.holiday_on(today).await {
        GateDecision::Holiday { holiday, source } => {
            tracing::info!("🎄 Holiday today, run skipped: {}", holiday.title);
            let (subject, body) = report::holiday_notification(
                &holiday.title,
                &holiday.kind,
                &source.to_string(),
            );
            if let Err(e) = notifier.send(&subject, &body).await {
                tracing::error!("📧 Could not send holiday email: {e}");
            }
            return Ok(());
        }
        GateDecision::WorkingDay => {}
        GateDecision::Unknown => {
            if config.calendar.fail_open {
                tracing::warn!("⚠️ Calendar sources unavailable, failing open");
            } else {
                tracing::warn!("⚠️ Calendar sources unavailable, failing closed — run skipped");
                return Ok(());
            }
        }
    }

    // Work-item list. An empty list (including backend failure) is a normal
    // "nothing to do" completion.
    let source = FlagBackend::new(&config.flags);
    let items = source.list_enabled().await;
    if items.is_empty() {
        tracing::info!("📋 No enabled identifiers, nothing to do");
        return Ok(());
    }

    let clock = Arc::new(webdriver_clock(&config.clock, config.dispatch.debug_mode));
    let dispatcher = WorkDispatcher::new(config.dispatch.clone(), clock, notifier);
    let summary = dispatcher.run(items).await;

    if config.dispatch.fail_on_partial && summary.failed > 0 {
        anyhow::bail!(
            "{} of {} item(s) failed (dispatch.fail_on_partial is set)",
            summary.failed,
            summary.total
        );
    }
    Ok(())
}
