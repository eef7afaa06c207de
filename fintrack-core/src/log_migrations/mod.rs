//! Event log schema
//!
//! Script N takes `logs.duckdb` from schema version N-1 to N. Scripts are
//! compiled in; append new ones and leave shipped ones untouched.

pub const LOG_SCHEMA: &[&str] = &[include_str!("001_api_events.sql")];
