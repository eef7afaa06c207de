//! Account domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::de;

/// An account as returned by `/accounts/`
///
/// Only the fields the client displays are typed. Everything else the
/// API sends is kept in `extra` so nothing is lost when re-serializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub official_account_name: Option<String>,
    /// Freeform, e.g. "checking", "savings", "credit_card"
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub sub_account_type: Option<String>,
    /// Masked number like ****4321
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "de::optional_amount")]
    pub current_balance: Option<Decimal>,
    /// Only meaningful for credit cards
    #[serde(default, deserialize_with = "de::optional_amount")]
    pub available_balance: Option<Decimal>,
    #[serde(default, deserialize_with = "de::optional_amount")]
    pub limit: Option<Decimal>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Account {
    /// Account type bucket used for filtering
    pub fn normalized_type(&self) -> String {
        normalize_account_type(self.account_type.as_deref())
    }

    /// Display name, falling back to the official name and then the id
    pub fn display_name(&self) -> &str {
        self.account_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.official_account_name.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn currency(&self) -> &str {
        self.iso_currency_code.as_deref().unwrap_or("USD")
    }
}

/// Collapse account type spellings into the buckets the API uses
///
/// Missing and "checking" map to "current"; credit card spellings map to
/// "credit card"; anything else is trimmed and lowercased.
pub fn normalize_account_type(account_type: Option<&str>) -> String {
    let Some(t) = account_type else {
        return "current".to_string();
    };
    let s = t.trim().to_lowercase();
    match s.as_str() {
        "checking" => "current".to_string(),
        "credit" | "creditcard" | "credit_card" => "credit card".to_string(),
        _ => s,
    }
}

/// Payload for `POST /accounts/`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub account_name: String,
    pub official_account_name: String,
    pub account_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_account_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub iso_currency_code: String,
    pub current_balance: Decimal,
    pub limit: Decimal,
    pub loans: Decimal,
    pub depts: Decimal,
    pub is_internal_account: bool,
    pub icon: i32,
}

impl NewAccount {
    /// A manual account with zeroed limits
    pub fn manual(name: impl Into<String>, account_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            official_account_name: name.clone(),
            account_name: name,
            account_type: account_type.into(),
            sub_account_type: None,
            account_number: None,
            account_id: None,
            iso_currency_code: "USD".to_string(),
            current_balance: Decimal::ZERO,
            limit: Decimal::ZERO,
            loans: Decimal::ZERO,
            depts: Decimal::ZERO,
            is_internal_account: true,
            icon: 1,
        }
    }
}
