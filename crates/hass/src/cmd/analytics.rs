//! Analytics command - inspect, configure and submit installation analytics
//!
//! Displays exactly what would be sent, for transparency.
//!
//! # Usage
//!
//! ```bash
//! # Show preferences and the payload that would be sent
//! hass analytics show
//! hass analytics show --json
//!
//! # Replace the enabled categories (no tags disables analytics)
//! hass analytics set base integrations statistics
//!
//! # Submit once / run the daily scheduler until Ctrl+C
//! hass analytics submit
//! hass analytics run
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hass_config::Config;
use hass_telemetry::{
    AnalyticsPayload, PreferenceSet, ReportingCategory, SubmitOutcome, scheduler,
};
use tracing::info;

use crate::host::build_reporter;

/// Analytics command arguments
#[derive(Args, Debug)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub command: AnalyticsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AnalyticsCommand {
    /// Show the active preferences and what would be sent
    Show(ShowArgs),

    /// Print the enabled reporting categories
    Preferences,

    /// Replace the enabled reporting categories
    Set(SetArgs),

    /// Submit analytics once
    Submit,

    /// Submit now and then on every interval until interrupted
    Run,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Categories to enable (base, integrations, statistics)
    pub tags: Vec<String>,
}

/// Run the analytics command
pub async fn run(args: AnalyticsArgs, config: &Config) -> Result<()> {
    let reporter = build_reporter(&config.analytics).await?;

    match args.command {
        AnalyticsCommand::Show(show) => {
            let prefs = reporter.preferences().await;
            let payload = reporter.preview().await;
            if show.json {
                let doc = serde_json::json!({
                    "preferences": prefs,
                    "payload": payload,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_show(&prefs, payload.as_ref(), &reporter.config().endpoint);
            }
        }
        AnalyticsCommand::Preferences => {
            println!("{}", reporter.preferences().await);
        }
        AnalyticsCommand::Set(set) => {
            let prefs = PreferenceSet::parse_tags(&set.tags)?;
            reporter
                .save_preferences(prefs.clone())
                .await
                .context("failed to save analytics preferences")?;
            println!("Analytics preferences: {}", prefs);
            if !prefs.is_empty() && !prefs.allows_submission() {
                println!("Note: nothing is sent until 'base' is enabled");
            }
        }
        AnalyticsCommand::Submit => {
            let outcome = reporter.submit().await;
            println!("Analytics {}", outcome);
            if matches!(outcome, SubmitOutcome::Rejected { .. } | SubmitOutcome::Failed(_)) {
                anyhow::bail!("analytics submission {}", outcome);
            }
        }
        AnalyticsCommand::Run => {
            let interval = reporter.config().interval;
            let handle = scheduler::spawn(reporter, interval);
            info!(interval = ?interval, "Analytics scheduler running, Ctrl+C to stop");

            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for shutdown signal")?;
            info!("Shutting down analytics scheduler");
            let _ = handle.shutdown();
        }
    }

    Ok(())
}

fn print_show(prefs: &PreferenceSet, payload: Option<&AnalyticsPayload>, endpoint: &str) {
    println!("Hass Analytics");
    println!("==============");
    println!();

    println!("Preferences:");
    for category in ReportingCategory::ALL {
        let mark = if prefs.contains(category) { "x" } else { " " };
        println!("  [{}] {}", mark, category);
    }
    println!();

    let Some(payload) = payload else {
        println!("Status:   DISABLED (no data will be sent)");
        println!();
        println!("To enable analytics:");
        println!("  hass analytics set base");
        return;
    };

    println!("Status:   ENABLED ({})", endpoint);
    println!();

    println!("Installation:");
    println!("  Install ID: {}", payload.huuid);
    println!("  Version:    {}", payload.version);
    println!("  Type:       {}", payload.installation_type);

    if let Some(components) = &payload.components {
        println!();
        println!("Integrations:");
        println!(
            "  Built-in: {}",
            if components.is_empty() {
                "(none)".to_string()
            } else {
                components.join(", ")
            }
        );
        println!(
            "  Custom:   {}",
            if payload.custom_integrations == Some(true) {
                "yes"
            } else {
                "no"
            }
        );
    }

    if payload.state_count.is_some() {
        println!();
        println!("Statistics:");
        print_count("States", payload.state_count);
        print_count("Automations", payload.automation_count);
        print_count("Integrations", payload.integration_count);
        print_count("Users", payload.user_count);
    }
}

fn print_count(label: &str, value: Option<u64>) {
    if let Some(value) = value {
        println!("  {:<13} {}", format!("{}:", label), value);
    }
}
