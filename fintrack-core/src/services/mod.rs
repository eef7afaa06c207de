//! Service layer - business logic orchestration
//!
//! Services turn API endpoints into typed operations. Each one holds the
//! shared `ApiClient` and focuses on a single feature area.

mod accounts;
mod auth;
mod bank_link;
mod categories;
pub mod event_log;
pub mod transactions;

pub use accounts::AccountService;
pub use auth::AuthService;
pub use bank_link::BankLinkService;
pub use categories::CategoryService;
pub use event_log::{
    EndpointFailures, EventFilter, EventKind, EventLog, LogEvent, LoggedEvent, SessionSummary,
    Source,
};
pub use transactions::{TransactionQuery, TransactionService};
