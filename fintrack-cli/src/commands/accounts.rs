//! Accounts command - list and create accounts

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Input;
use fintrack_core::domain::normalize_account_type;
use fintrack_core::NewAccount;
use rust_decimal::Decimal;

use super::{get_context, Logger};
use crate::output;

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// List accounts
    List {
        /// Only accounts of this type (e.g. current, savings, "credit card")
        #[arg(long = "type")]
        account_type: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a manual account
    New {
        /// Account name
        #[arg(long)]
        name: Option<String>,
        /// Account type
        #[arg(long = "type", default_value = "checking")]
        account_type: String,
        /// ISO currency code
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Opening balance
        #[arg(long)]
        balance: Option<String>,
        /// Masked account number, e.g. ****1234
        #[arg(long)]
        number: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: AccountsCommands, logger: &Logger) -> Result<()> {
    match command {
        AccountsCommands::List { account_type, json } => run_list(account_type, json, logger).await,
        AccountsCommands::New {
            name,
            account_type,
            currency,
            balance,
            number,
            json,
        } => run_new(name, account_type, currency, balance, number, json, logger).await,
    }
}

async fn run_list(account_type: Option<String>, json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;

    let pb = output::spinner("Loading accounts...");
    let result = ctx.account_service.list().await;
    pb.finish_and_clear();

    let wanted = account_type.map(|t| normalize_account_type(Some(&t)));
    let accounts: Vec<_> = result?
        .into_iter()
        .filter(|a| wanted.as_ref().map_or(true, |t| a.normalized_type() == *t))
        .collect();

    if json {
        return output::print_json(&accounts);
    }

    if accounts.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Type", "Number", "Balance", "Available"]);
    for account in &accounts {
        table.add_row(vec![
            account.id.clone(),
            output::truncate(account.display_name(), 32),
            account.normalized_type(),
            account.account_number.clone().unwrap_or_default(),
            output::format_amount(account.current_balance, account.currency()),
            output::format_amount(account.available_balance, account.currency()),
        ]);
    }
    println!("{}", table);
    println!("{}", format!("{} account(s)", accounts.len()).dimmed());
    Ok(())
}

async fn run_new(
    name: Option<String>,
    account_type: String,
    currency: String,
    balance: Option<String>,
    number: Option<String>,
    json: bool,
    logger: &Logger,
) -> Result<()> {
    let ctx = get_context(logger)?;

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Account name").interact_text()?,
    };

    let current_balance: Decimal = match balance {
        Some(b) => b
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid balance amount: {}", b))?,
        None => Decimal::ZERO,
    };

    let mut account = NewAccount::manual(name.trim(), account_type.trim());
    account.iso_currency_code = currency.trim().to_uppercase();
    account.current_balance = current_balance;
    account.account_number = number;

    let pb = output::spinner("Creating account...");
    let result = ctx.account_service.create(&account).await;
    pb.finish_and_clear();
    let created = result?;

    if json {
        return output::print_json(&created);
    }

    output::success("Account created");
    println!("  ID:      {}", created.id);
    println!("  Name:    {}", created.display_name());
    println!("  Type:    {}", created.normalized_type());
    println!(
        "  Balance: {}",
        output::format_amount(created.current_balance, created.currency())
    );
    Ok(())
}
