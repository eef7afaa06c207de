//! FinTrack CLI - personal finance tracking in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fintrack_core::services::{EventKind, LogEvent};

mod commands;
mod output;

use commands::{accounts, auth, categories, config, link, logs, request, status, transactions, Logger};

/// FinTrack - personal finance tracking in your terminal
#[derive(Parser)]
#[command(name = "ft", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store a session
    Login {
        /// Username (prompted if omitted)
        username: Option<String>,
        /// Password (prompted if omitted)
        #[arg(long, env = "FINTRACK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Create a new user account
    Register {
        /// Username (prompted if omitted)
        username: Option<String>,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Password (prompted if omitted)
        #[arg(long, env = "FINTRACK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show the logged-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show API target and session state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List and create accounts
    Accounts {
        #[command(subcommand)]
        command: accounts::AccountsCommands,
    },

    /// List and record transactions
    Transactions {
        #[command(subcommand)]
        command: transactions::TransactionsCommands,
    },

    /// List transaction categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect a bank through Plaid
    Link {
        #[command(subcommand)]
        command: link::LinkCommands,
    },

    /// Send a raw authenticated request to the API
    Request {
        /// Path relative to the API base, e.g. /accounts/
        path: String,
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Request body; `@-` reads it from stdin
        #[arg(short, long)]
        data: Option<String>,
        /// Extra header as 'Name: value' (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Name recorded in the event log; never includes arguments
    fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Register { .. } => "register",
            Commands::Whoami { .. } => "whoami",
            Commands::Status { .. } => "status",
            Commands::Accounts { .. } => "accounts",
            Commands::Transactions { .. } => "transactions",
            Commands::Categories { .. } => "categories",
            Commands::Link { .. } => "link",
            Commands::Request { .. } => "request",
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = commands::get_logger();
    let name = cli.command.name();

    commands::log_event(&logger, LogEvent::new(EventKind::CommandExecuted).with_command(name));

    match run(cli, &logger).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &logger,
                LogEvent::new(EventKind::CommandFailed)
                    .with_command(name)
                    .with_error(e.to_string()),
            );
            output::error(&e.to_string());

            let session_expired = e
                .downcast_ref::<fintrack_core::Error>()
                .is_some_and(|err| err.is_session_expired());
            if session_expired {
                eprintln!("Run `ft login` to start a new session.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, logger: &Logger) -> Result<()> {
    match cli.command {
        Commands::Login { username, password } => auth::run_login(username, password, logger).await,
        Commands::Logout => auth::run_logout(logger),
        Commands::Register {
            username,
            email,
            password,
        } => auth::run_register(username, email, password, logger).await,
        Commands::Whoami { json } => auth::run_whoami(json, logger).await,
        Commands::Status { json } => status::run(json, logger),
        Commands::Accounts { command } => accounts::run(command, logger).await,
        Commands::Transactions { command } => transactions::run(command, logger).await,
        Commands::Categories { json } => categories::run(json, logger).await,
        Commands::Link { command } => link::run(command, logger).await,
        Commands::Request {
            path,
            method,
            data,
            headers,
        } => request::run(&path, &method, data, headers, logger).await,
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command, logger),
    }
}
