//! Logs command - inspect API and session events

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use fintrack_core::services::{EventFilter, EventKind, EventLog, SessionSummary};

use super::Logger;
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    Events {
        /// Number of events to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only this kind, e.g. session_expired or request_failed
        #[arg(long)]
        kind: Option<String>,
        /// Only this API path, e.g. /accounts/
        #[arg(long)]
        endpoint: Option<String>,
        /// Only events carrying an error
        #[arg(long)]
        failures: bool,
        #[arg(long)]
        json: bool,
    },
    /// Failed API calls grouped by endpoint and status
    Failures {
        #[arg(short, long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Refreshes, expired sessions and failure counts
    Session {
        #[arg(long)]
        json: bool,
    },
    /// Delete events older than N days
    Prune {
        #[arg(long, default_value = "30")]
        days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

pub fn run(command: LogsCommands, logger: &Logger) -> Result<()> {
    let log = logger
        .as_deref()
        .context("Event log unavailable (could not open logs.duckdb)")?;

    match command {
        LogsCommands::Events {
            limit,
            kind,
            endpoint,
            failures,
            json,
        } => {
            let mut filter = EventFilter::latest(limit);
            if let Some(kind) = kind {
                filter = filter.kind(kind.parse::<EventKind>()?);
            }
            if let Some(endpoint) = endpoint {
                filter = filter.endpoint(&endpoint);
            }
            if failures {
                filter = filter.failures_only();
            }
            show_events(log, &filter, json)
        }
        LogsCommands::Failures { limit, json } => show_failures(log, limit, json),
        LogsCommands::Session { json } => show_session(log, json),
        LogsCommands::Prune { days, yes } => prune(log, days, yes),
    }
}

fn show_events(log: &EventLog, filter: &EventFilter, json: bool) -> Result<()> {
    let events = log.recent(filter)?;
    if json {
        return output::print_json(&events);
    }
    if events.is_empty() {
        println!("No matching events.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Event", "Where", "Status", "Error"]);
    for event in events {
        let place = event.endpoint.or(event.command).unwrap_or_default();
        let kind = if event.error.is_some() {
            event.kind.red().to_string()
        } else {
            event.kind
        };
        table.add_row(vec![
            local_time(event.at_ms),
            kind,
            place,
            event.status.map(|s| s.to_string()).unwrap_or_default(),
            output::truncate(event.error.as_deref().unwrap_or(""), 60),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn show_failures(log: &EventLog, limit: usize, json: bool) -> Result<()> {
    let groups = log.failures_by_endpoint(limit)?;
    if json {
        return output::print_json(&groups);
    }
    if groups.is_empty() {
        output::success("No failed API calls recorded.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Endpoint", "Status", "Count", "Last seen", "Last error"]);
    for group in groups {
        table.add_row(vec![
            group.endpoint,
            group.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
            group.count.to_string(),
            local_time(group.last_at_ms),
            output::truncate(group.last_error.as_deref().unwrap_or(""), 50),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn show_session(log: &EventLog, json: bool) -> Result<()> {
    let summary = log.summary()?;
    let size_bytes = std::fs::metadata(log.path()).map(|m| m.len()).unwrap_or(0);

    if json {
        return output::print_json(&serde_json::json!({
            "summary": summary,
            "database_path": log.path(),
            "database_size_bytes": size_bytes,
        }));
    }

    print_session(&summary);
    println!();
    println!(
        "  {} ({})",
        log.path().display().to_string().dimmed(),
        output::format_size(size_bytes)
    );
    Ok(())
}

fn print_session(summary: &SessionSummary) {
    println!("{}", "Session".bold());
    println!("  Token refreshes:     {}", summary.refreshes);
    let invalid = summary.invalid_refreshes.to_string();
    println!(
        "  Invalid refreshes:   {}",
        if summary.invalid_refreshes > 0 { invalid.yellow() } else { invalid.normal() }
    );
    let expired = summary.expired_sessions.to_string();
    println!(
        "  Sessions expired:    {}",
        if summary.expired_sessions > 0 { expired.yellow() } else { expired.normal() }
    );

    println!("{}", "Activity".bold());
    println!("  Failed API calls:    {}", summary.failed_requests);
    println!(
        "  Commands:            {} ({} failed)",
        summary.commands, summary.failed_commands
    );
    match (summary.first_at_ms, summary.last_at_ms) {
        (Some(first), Some(last)) => {
            println!("  Window:              {} .. {}", local_time(first), local_time(last))
        }
        _ => println!("  Window:              no events yet"),
    }
}

fn prune(log: &EventLog, days: u64, yes: bool) -> Result<()> {
    if !yes
        && !Confirm::new()
            .with_prompt(format!("Delete events older than {} days?", days))
            .default(false)
            .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    let deleted = log.prune_older_than(Duration::from_secs(days * 24 * 60 * 60))?;
    output::success(&format!("Deleted {} events", deleted));
    Ok(())
}

fn local_time(at_ms: i64) -> String {
    Utc.timestamp_millis_opt(at_ms)
        .single()
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| at_ms.to_string())
}
