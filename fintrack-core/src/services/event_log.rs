//! API event log
//!
//! Session and request outcomes are appended to `logs.duckdb` in the data
//! directory: token refreshes, expired sessions, failed calls and CLI
//! commands. A row carries the endpoint path without its query string and
//! the HTTP status. Tokens, passwords and response bodies never reach it.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Result};
use duckdb::types::Value;
use duckdb::{params, params_from_iter, Connection, Row};
use serde::Serialize;

use crate::log_migrations::LOG_SCHEMA;

const LOG_FILE: &str = "logs.duckdb";

const EVENT_COLUMNS: &str =
    "id, at_ms, source, version, kind, command, endpoint, status, error";

/// Unix time in milliseconds
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Strip the query string so filters and search terms stay out of the log
pub fn endpoint_of(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A refresh token bought a new access token
    TokenRefreshed,
    /// The refresh endpoint answered 2xx without a usable `access`
    RefreshInvalidResponse,
    /// Credentials were dropped and the user must log in again
    SessionExpired,
    /// An API call ended with a non-2xx status
    RequestFailed,
    CommandExecuted,
    CommandFailed,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::TokenRefreshed,
        EventKind::RefreshInvalidResponse,
        EventKind::SessionExpired,
        EventKind::RequestFailed,
        EventKind::CommandExecuted,
        EventKind::CommandFailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::TokenRefreshed => "token_refreshed",
            EventKind::RefreshInvalidResponse => "refresh_invalid_response",
            EventKind::SessionExpired => "session_expired",
            EventKind::RequestFailed => "request_failed",
            EventKind::CommandExecuted => "command_executed",
            EventKind::CommandFailed => "command_failed",
        }
    }
}

impl FromStr for EventKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_");
        match EventKind::ALL.iter().find(|k| k.as_str() == wanted) {
            Some(kind) => Ok(*kind),
            None => bail!(
                "Unknown event kind '{}' (expected one of: {})",
                s,
                EventKind::ALL.map(|k| k.as_str()).join(", ")
            ),
        }
    }
}

/// Which program wrote an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cli,
    Library,
}

impl Source {
    fn as_str(self) -> &'static str {
        match self {
            Source::Cli => "cli",
            Source::Library => "library",
        }
    }
}

/// An event about to be recorded
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub kind: EventKind,
    pub command: Option<String>,
    pub endpoint: Option<String>,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl LogEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            command: None,
            endpoint: None,
            status: None,
            error: None,
        }
    }

    /// CLI command name, never its arguments
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// API path; any query string is dropped
    pub fn with_endpoint(mut self, path: &str) -> Self {
        self.endpoint = Some(endpoint_of(path).to_string());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

/// A recorded event
#[derive(Debug, Clone, Serialize)]
pub struct LoggedEvent {
    pub id: i64,
    pub at_ms: i64,
    pub source: String,
    pub version: String,
    pub kind: String,
    pub command: Option<String>,
    pub endpoint: Option<String>,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl LoggedEvent {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        let status: Option<i32> = row.get(7)?;
        Ok(Self {
            id: row.get(0)?,
            at_ms: row.get(1)?,
            source: row.get(2)?,
            version: row.get(3)?,
            kind: row.get(4)?,
            command: row.get(5)?,
            endpoint: row.get(6)?,
            status: status.and_then(|s| u16::try_from(s).ok()),
            error: row.get(8)?,
        })
    }
}

/// Selection for [`EventLog::recent`]
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub limit: usize,
    pub kind: Option<EventKind>,
    pub endpoint: Option<String>,
    /// Only events that carry an error message
    pub failures_only: bool,
}

impl EventFilter {
    pub fn latest(limit: usize) -> Self {
        Self {
            limit,
            kind: None,
            endpoint: None,
            failures_only: false,
        }
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn endpoint(mut self, path: &str) -> Self {
        self.endpoint = Some(endpoint_of(path).to_string());
        self
    }

    pub fn failures_only(mut self) -> Self {
        self.failures_only = true;
        self
    }
}

/// Failed API calls sharing an endpoint and status
#[derive(Debug, Clone, Serialize)]
pub struct EndpointFailures {
    pub endpoint: String,
    pub status: Option<u16>,
    pub count: u64,
    pub last_at_ms: i64,
    pub last_error: Option<String>,
}

/// Session health across the whole log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub events: u64,
    pub commands: u64,
    pub failed_commands: u64,
    pub failed_requests: u64,
    pub refreshes: u64,
    pub invalid_refreshes: u64,
    pub expired_sessions: u64,
    pub first_at_ms: Option<i64>,
    pub last_at_ms: Option<i64>,
}

/// Handle on `logs.duckdb`
///
/// DuckDB allows one open handle per file in a process; share it through
/// an `Arc`.
pub struct EventLog {
    conn: Mutex<Connection>,
    path: PathBuf,
    source: Source,
    version: String,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("path", &self.path)
            .field("source", &self.source)
            .finish()
    }
}

impl EventLog {
    /// Open (or create) the log in `data_dir` and bring its schema up to date
    pub fn open(data_dir: &Path, source: Source, version: impl Into<String>) -> Result<Self> {
        let path = data_dir.join(LOG_FILE);
        let conn = Connection::open(&path)?;
        migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            source,
            version: version.into(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("Event log lock poisoned: {}", e))
    }

    pub fn record(&self, event: &LogEvent) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO api_events (at_ms, source, version, kind, command, endpoint, status, error)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                now_ms(),
                self.source.as_str(),
                &self.version,
                event.kind.as_str(),
                &event.command,
                &event.endpoint,
                event.status.map(i32::from),
                &event.error,
            ],
        )?;
        Ok(())
    }

    /// Newest events first
    pub fn recent(&self, filter: &EventFilter) -> Result<Vec<LoggedEvent>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(kind) = filter.kind {
            clauses.push("kind = ?");
            args.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(endpoint) = &filter.endpoint {
            clauses.push("endpoint = ?");
            args.push(Value::Text(endpoint.clone()));
        }
        if filter.failures_only {
            clauses.push("error IS NOT NULL");
        }
        args.push(Value::BigInt(filter.limit as i64));

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM api_events {} ORDER BY id DESC LIMIT ?",
            EVENT_COLUMNS, where_sql
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let events = stmt
            .query_map(params_from_iter(args), LoggedEvent::from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(events)
    }

    /// Failed calls grouped by endpoint and status, most frequent first
    pub fn failures_by_endpoint(&self, limit: usize) -> Result<Vec<EndpointFailures>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT endpoint, status, count(*) AS n, max(at_ms) AS last_at, arg_max(error, id)
             FROM api_events
             WHERE kind = ? AND endpoint IS NOT NULL
             GROUP BY endpoint, status
             ORDER BY n DESC, last_at DESC
             LIMIT ?",
        )?;

        let groups = stmt
            .query_map(
                params![EventKind::RequestFailed.as_str(), limit as i64],
                |row| {
                    let status: Option<i32> = row.get(1)?;
                    let count: i64 = row.get(2)?;
                    Ok(EndpointFailures {
                        endpoint: row.get(0)?,
                        status: status.and_then(|s| u16::try_from(s).ok()),
                        count: count as u64,
                        last_at_ms: row.get(3)?,
                        last_error: row.get(4)?,
                    })
                },
            )?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(groups)
    }

    pub fn summary(&self) -> Result<SessionSummary> {
        let count_of = |kind: EventKind| format!("count(*) FILTER (WHERE kind = '{}')", kind.as_str());
        let sql = format!(
            "SELECT count(*), {}, {}, {}, {}, {}, {}, min(at_ms), max(at_ms) FROM api_events",
            count_of(EventKind::CommandExecuted),
            count_of(EventKind::CommandFailed),
            count_of(EventKind::RequestFailed),
            count_of(EventKind::TokenRefreshed),
            count_of(EventKind::RefreshInvalidResponse),
            count_of(EventKind::SessionExpired),
        );

        let conn = self.conn()?;
        let summary = conn.query_row(&sql, [], |row| {
            let n = |i: usize| row.get::<_, i64>(i).map(|v| v as u64);
            Ok(SessionSummary {
                events: n(0)?,
                commands: n(1)?,
                failed_commands: n(2)?,
                failed_requests: n(3)?,
                refreshes: n(4)?,
                invalid_refreshes: n(5)?,
                expired_sessions: n(6)?,
                first_at_ms: row.get(7)?,
                last_at_ms: row.get(8)?,
            })
        })?;
        Ok(summary)
    }

    /// Delete events at least `age` old; returns how many went
    pub fn prune_older_than(&self, age: Duration) -> Result<u64> {
        let cutoff = now_ms() - age.as_millis() as i64;
        let deleted = self
            .conn()?
            .execute("DELETE FROM api_events WHERE at_ms <= ?", [cutoff])?;
        Ok(deleted as u64)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Apply the schema scripts this database has not seen yet
fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS log_schema_version (version BIGINT NOT NULL)",
    )?;
    let current: i64 = conn.query_row(
        "SELECT coalesce(max(version), 0) FROM log_schema_version",
        [],
        |row| row.get(0),
    )?;

    for (index, script) in LOG_SCHEMA.iter().enumerate().skip(current as usize) {
        conn.execute_batch(script)?;
        conn.execute(
            "INSERT INTO log_schema_version (version) VALUES (?)",
            [index as i64 + 1],
        )?;
    }
    Ok(())
}
