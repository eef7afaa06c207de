//! Status command - show API target and session state

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use super::{get_context, Logger};

#[derive(Serialize)]
struct StatusSummary {
    api_base: String,
    data_dir: String,
    logged_in: bool,
    has_refresh_token: bool,
    single_flight_refresh: bool,
}

pub fn run(json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let credentials = ctx.client.credentials().get()?;

    let status = StatusSummary {
        api_base: ctx.client.base_url().to_string(),
        data_dir: ctx.data_dir.display().to_string(),
        logged_in: credentials.has_access_token(),
        has_refresh_token: credentials.has_refresh_token(),
        single_flight_refresh: ctx.config.single_flight_refresh,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "FinTrack Status".bold());
    println!();

    let yes_no = |b: bool| if b { "yes".green().to_string() } else { "no".red().to_string() };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["API".to_string(), status.api_base.clone()]);
    table.add_row(vec!["Data directory".to_string(), status.data_dir.clone()]);
    table.add_row(vec!["Logged in".to_string(), yes_no(status.logged_in)]);
    table.add_row(vec!["Refresh token".to_string(), yes_no(status.has_refresh_token)]);
    println!("{}", table);

    if status.logged_in && !status.has_refresh_token {
        println!();
        println!(
            "{}",
            "No refresh token stored; the session ends when the access token expires.".yellow()
        );
    }

    Ok(())
}
