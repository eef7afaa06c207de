//! Transactions command - paged listing and manual entry

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Input;
use fintrack_core::domain::normalize_account_type;
use fintrack_core::services::transactions::{DEFAULT_PAGE_SIZE, TransactionQuery};
use fintrack_core::{NewTransaction, TransactionFilter};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{get_context, Logger};
use crate::output;

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List one page of transactions, newest first
    List {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
        /// Rows per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
        /// Server-side search
        #[arg(long)]
        search: Option<String>,
        /// Only this account (ID)
        #[arg(long)]
        account: Option<String>,
        /// Filter the page locally by text (name, merchant, category, note, account)
        #[arg(long)]
        filter: Option<String>,
        /// Filter the page locally by account type
        #[arg(long = "type")]
        account_type: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a manual transaction
    New {
        /// Account ID (defaults to the first account)
        #[arg(long)]
        account: Option<String>,
        /// Amount
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// Description
        #[arg(long)]
        name: Option<String>,
        /// Merchant name
        #[arg(long, default_value = "")]
        merchant: String,
        /// Category name; unknown names fall back to the last category
        #[arg(long)]
        category: Option<String>,
        /// Mark as income
        #[arg(long)]
        income: bool,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Free-form note
        #[arg(long, default_value = "")]
        note: String,
        /// ISO currency code
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ListOutput<'a, T: Serialize> {
    count: u64,
    page: u32,
    total_pages: u64,
    results: Vec<&'a T>,
}

pub async fn run(command: TransactionsCommands, logger: &Logger) -> Result<()> {
    match command {
        TransactionsCommands::List {
            page,
            page_size,
            search,
            account,
            filter,
            account_type,
            json,
        } => {
            let mut query = TransactionQuery::default().page(page).page_size(page_size);
            if let Some(s) = search {
                query = query.search(s);
            }
            if let Some(a) = &account {
                query = query.account(a.clone());
            }
            let filter = TransactionFilter {
                text: filter,
                account_type: account_type.map(|t| normalize_account_type(Some(&t))),
                account,
            };
            run_list(query, filter, json, logger).await
        }
        TransactionsCommands::New {
            account,
            amount,
            name,
            merchant,
            category,
            income,
            date,
            note,
            currency,
            json,
        } => {
            let draft = Draft {
                account,
                amount,
                name,
                merchant,
                category,
                income,
                date,
                note,
                currency,
            };
            run_new(draft, json, logger).await
        }
    }
}

async fn run_list(
    query: TransactionQuery,
    filter: TransactionFilter,
    json: bool,
    logger: &Logger,
) -> Result<()> {
    let ctx = get_context(logger)?;

    let pb = output::spinner("Loading transactions...");
    let result = async {
        let page = ctx.transaction_service.list(&query).await?;
        // Account details are only needed to filter or label rows
        let accounts = ctx.account_service.list().await?;
        Ok::<_, fintrack_core::Error>((page, accounts))
    }
    .await;
    pb.finish_and_clear();
    let (page, accounts) = result?;

    let rows = filter.apply(&page.results, &accounts);
    let total_pages = page.total_pages(query.page_size);

    if json {
        return output::print_json(&ListOutput {
            count: page.count,
            page: query.page,
            total_pages,
            results: rows,
        });
    }

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Description", "Category", "Account", "Amount"]);
    for tx in &rows {
        let account_name = tx
            .account
            .as_deref()
            .and_then(|id| accounts.iter().find(|a| a.id == id))
            .map(|a| a.display_name().to_string())
            .unwrap_or_default();
        let currency = tx.currency_code.as_deref().unwrap_or("USD");
        let amount = output::format_amount(tx.amount, currency);
        let amount = if tx.is_income {
            amount.green().to_string()
        } else {
            amount
        };

        table.add_row(vec![
            tx.date().map(|d| d.to_string()).unwrap_or_default(),
            output::truncate(tx.label(), 40),
            tx.category_label().unwrap_or("").to_string(),
            output::truncate(&account_name, 24),
            amount,
        ]);
    }
    println!("{}", table);

    let (start, end) = page.display_range(query.page, query.page_size);
    let mut footer = format!(
        "Showing {}-{} of {} (page {} of {})",
        start, end, page.count, query.page, total_pages
    );
    if !filter.is_empty() {
        footer.push_str(&format!(", {} matching filter", rows.len()));
    }
    println!("{}", footer.dimmed());
    Ok(())
}

struct Draft {
    account: Option<String>,
    amount: Option<String>,
    name: Option<String>,
    merchant: String,
    category: Option<String>,
    income: bool,
    date: Option<String>,
    note: String,
    currency: String,
}

async fn run_new(draft: Draft, json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;

    let account = match draft.account {
        Some(a) => a,
        None => ctx
            .account_service
            .list()
            .await?
            .into_iter()
            .next()
            .map(|a| a.id)
            .ok_or_else(|| anyhow::anyhow!("No accounts yet. Create one with `ft accounts new`."))?,
    };

    let name = match draft.name {
        Some(n) => n,
        None => Input::new().with_prompt("Description").interact_text()?,
    };

    let amount_str = match draft.amount {
        Some(a) => a,
        None => Input::new().with_prompt("Amount").interact_text()?,
    };
    let amount: Decimal = amount_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid amount: {}", amount_str))?;

    let transaction_date = match draft.date {
        Some(d) => {
            let date = NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("Invalid date format. Use YYYY-MM-DD"))?;
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| anyhow::anyhow!("Invalid date: {}", d))?;
            Utc.from_utc_datetime(&midnight)
        }
        None => Utc::now(),
    };

    let category = match draft.category.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(c) => ctx.category_service.resolve(c.trim()).await?.map(|c| c.id),
        None => None,
    };

    let new_tx = NewTransaction {
        name: name.trim().to_string(),
        merchant_name: draft.merchant.trim().to_string(),
        amount,
        is_income: draft.income,
        category,
        currency_code: draft.currency.trim().to_uppercase(),
        transaction_date,
        account,
        note: draft.note,
    };

    let pb = output::spinner("Saving transaction...");
    let result = ctx.transaction_service.create(&new_tx).await;
    pb.finish_and_clear();
    let created = result?;

    if json {
        return output::print_json(&created);
    }

    output::success("Transaction created");
    println!("  ID:     {}", created.id);
    println!("  Name:   {}", created.label());
    println!(
        "  Amount: {}",
        output::format_amount(created.amount, created.currency_code.as_deref().unwrap_or("USD"))
    );
    Ok(())
}
