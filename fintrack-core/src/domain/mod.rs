//! Core domain entities
//!
//! Plain data: credentials, request options, response bodies, errors and
//! lenient typed views over API payloads. No I/O lives here.

mod account;
pub mod body;
mod category;
pub mod credentials;
mod de;
pub mod page;
pub mod request;
pub mod result;
mod transaction;
mod user;

pub use account::{normalize_account_type, Account, NewAccount};
pub use body::ParsedBody;
pub use category::Category;
pub use credentials::CredentialPair;
pub use page::Page;
pub use request::RequestOptions;
pub use transaction::{NewTransaction, Transaction, TransactionFilter};
pub use user::{Profile, RegisterRequest};
