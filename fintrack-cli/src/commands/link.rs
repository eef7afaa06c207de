//! Link command - connect a bank through the server's Plaid integration
//!
//! `ft link token` prints a Link token for use in Plaid Link; once the user
//! finishes there, `ft link exchange <public_token>` completes the connection.

use anyhow::Result;
use clap::Subcommand;

use super::{get_context, Logger};
use crate::output;

#[derive(Subcommand)]
pub enum LinkCommands {
    /// Request a Plaid Link token
    Token {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Exchange a public token from Plaid Link
    Exchange {
        /// Public token returned by Plaid Link
        public_token: String,
        /// Institution name to record with the connection
        #[arg(long)]
        institution: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: LinkCommands, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;

    match command {
        LinkCommands::Token { json } => {
            let token = ctx.bank_link_service.create_link_token().await?;
            if json {
                return output::print_json(&serde_json::json!({ "link_token": token }));
            }
            println!("{}", token);
        }
        LinkCommands::Exchange {
            public_token,
            institution,
            json,
        } => {
            let pb = output::spinner("Linking institution...");
            let result = ctx
                .bank_link_service
                .exchange_public_token(&public_token, institution.as_deref())
                .await;
            pb.finish_and_clear();
            let body = result?;

            if json {
                return output::print_json(&body);
            }
            output::success("Institution linked. Run `ft accounts list` to see new accounts.");
        }
    }

    Ok(())
}
