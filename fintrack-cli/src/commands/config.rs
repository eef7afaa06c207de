//! Config command - show and change client settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use fintrack_core::config::{Config, API_BASE_ENV};

use super::get_fintrack_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Point the client at another API base URL
    SetApi {
        /// e.g. https://fintrack.example.com/api
        url: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let fintrack_dir = get_fintrack_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&fintrack_dir)?;
            if json {
                return output::print_json(&serde_json::json!({
                    "api_base": config.api_base,
                    "timeout_secs": config.timeout.map_or(0, |t| t.as_secs()),
                    "single_flight_refresh": config.single_flight_refresh,
                    "settings_path": fintrack_dir.join("settings.json"),
                }));
            }

            println!("{}", "Settings".bold());
            println!("  API base:       {}", config.api_base);
            match config.timeout {
                Some(t) => println!("  Timeout:        {}s", t.as_secs()),
                None => println!("  Timeout:        none"),
            }
            println!("  Single-flight:  {}", config.single_flight_refresh);
            println!("  File:           {}", fintrack_dir.join("settings.json").display());
        }
        ConfigCommands::SetApi { url } => {
            let mut config = Config::load(&fintrack_dir)?;
            config.set_api_base(&url)?;
            config.save(&fintrack_dir)?;
            output::success(&format!("API base set to {}", config.api_base));

            if std::env::var(API_BASE_ENV).is_ok() {
                output::warning(&format!(
                    "{} is set and overrides this setting.",
                    API_BASE_ENV
                ));
            }
        }
    }

    Ok(())
}
