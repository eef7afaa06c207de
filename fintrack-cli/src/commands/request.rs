//! Request command - raw authenticated call against the API
//!
//! Goes through the same token attach / refresh / retry path as every
//! other command, which makes it handy for poking at new endpoints.

use std::io::{self, Read};

use anyhow::{Context, Result};
use fintrack_core::adapters::method_from_str;
use fintrack_core::{ParsedBody, RequestOptions};

use super::{get_context, Logger};

pub async fn run(
    path: &str,
    method: &str,
    data: Option<String>,
    headers: Vec<String>,
    logger: &Logger,
) -> Result<()> {
    let ctx = get_context(logger)?;

    let mut options = RequestOptions::new(method_from_str(method)?);
    for raw in &headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }

    let body = match data.as_deref() {
        // `-d @-` reads the body from stdin
        Some("@-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request body from stdin")?;
            Some(buffer)
        }
        Some(d) => Some(d.to_string()),
        // Piped input becomes the body of a non-GET request
        None if atty::isnt(atty::Stream::Stdin) && options.method.as_str() != "GET" => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer).filter(|b| !b.trim().is_empty())
        }
        None => None,
    };
    if let Some(b) = body {
        options = options.body(b);
    }

    let path = normalize_path(path);
    let response = ctx.client.request(&path, &options).await?;

    match response {
        ParsedBody::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        ParsedBody::Text(text) => println!("{}", text),
    }
    Ok(())
}

/// `Name: value` header syntax, as curl takes it
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Invalid header '{}', expected 'Name: value'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Invalid header '{}', empty name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Paths are relative to the API base and always start with `/`
fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
