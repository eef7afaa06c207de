//! Transaction domain model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::account::Account;
use super::de;

/// A ledger entry as returned by `/transactions/`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::optional_amount")]
    pub amount: Option<Decimal>,
    /// Category id or legacy category name
    #[serde(default, deserialize_with = "de::optional_id")]
    pub category: Option<String>,
    #[serde(default, rename = "category_display")]
    pub category_display: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// ISO 8601 timestamp string
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default, deserialize_with = "de::optional_id")]
    pub account: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Transaction {
    /// Calendar date of the transaction, if the timestamp parses
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.transaction_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
    }

    /// Category label for display
    pub fn category_label(&self) -> Option<&str> {
        self.category_display
            .as_deref()
            .or(self.category.as_deref())
    }

    /// Name, falling back to the merchant
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.merchant_name.as_deref())
            .unwrap_or("")
    }
}

/// Payload for `POST /transactions/`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub name: String,
    pub merchant_name: String,
    pub amount: Decimal,
    pub is_income: bool,
    /// Category id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub currency_code: String,
    pub transaction_date: DateTime<Utc>,
    pub account: String,
    pub note: String,
}

/// Local filter applied to one page of transactions
///
/// Empty text and `None` selectors match everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub text: Option<String>,
    /// Normalized account type, see `normalize_account_type`
    pub account_type: Option<String>,
    pub account: Option<String>,
}

impl TransactionFilter {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.account_type.is_none()
            && self.account.is_none()
    }

    /// Whether `tx` passes, given the account it belongs to (if known)
    pub fn matches(&self, tx: &Transaction, account: Option<&Account>) -> bool {
        let by_text = match self.text.as_deref().map(|t| t.trim().to_lowercase()) {
            None => true,
            Some(text) if text.is_empty() => true,
            Some(text) => [
                tx.name.as_deref(),
                tx.merchant_name.as_deref(),
                tx.category.as_deref(),
                tx.note.as_deref(),
                account.and_then(|a| a.account_number.as_deref()),
                account.and_then(|a| a.account_name.as_deref()),
            ]
            .iter()
            .flatten()
            .any(|v| v.to_lowercase().contains(&text)),
        };

        let by_type = match &self.account_type {
            None => true,
            Some(t) => {
                let acc_type = super::account::normalize_account_type(
                    account.and_then(|a| a.account_type.as_deref()),
                );
                acc_type == *t
            }
        };

        let by_account = match &self.account {
            None => true,
            Some(id) => tx.account.as_deref() == Some(id.as_str()),
        };

        by_text && by_type && by_account
    }

    /// Keep the transactions of `rows` that pass
    pub fn apply<'a>(&self, rows: &'a [Transaction], accounts: &[Account]) -> Vec<&'a Transaction> {
        rows.iter()
            .filter(|tx| {
                let account = tx
                    .account
                    .as_deref()
                    .and_then(|id| accounts.iter().find(|a| a.id == id));
                self.matches(tx, account)
            })
            .collect()
    }
}
