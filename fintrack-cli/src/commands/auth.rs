//! Session commands - login, logout, register, whoami

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use fintrack_core::RegisterRequest;

use super::{get_context, Logger};
use crate::output;

fn prompt_username(username: Option<String>) -> Result<String> {
    match username {
        Some(u) => Ok(u),
        None => Ok(Input::new().with_prompt("Username").interact_text()?),
    }
}

fn prompt_password(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub async fn run_login(
    username: Option<String>,
    password: Option<String>,
    logger: &Logger,
) -> Result<()> {
    let ctx = get_context(logger)?;
    let username = prompt_username(username)?;
    let password = prompt_password(password, false)?;

    let pb = output::spinner("Signing in...");
    let result = ctx.auth_service.login(&username, &password).await;
    pb.finish_and_clear();
    result?;

    output::success(&format!("Logged in as {}", username.trim()));
    Ok(())
}

pub fn run_logout(logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    if !ctx.auth_service.is_authenticated()? {
        output::info("Not logged in.");
        return Ok(());
    }
    ctx.auth_service.logout()?;
    output::success("Logged out.");
    Ok(())
}

pub async fn run_register(
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    logger: &Logger,
) -> Result<()> {
    let ctx = get_context(logger)?;
    let username = prompt_username(username)?;
    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = prompt_password(password, true)?;

    let request = RegisterRequest {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password,
    };

    let pb = output::spinner("Creating account...");
    let result = ctx.auth_service.register(&request).await;
    pb.finish_and_clear();
    result?;

    output::success(&format!("Registered {}. Run `ft login` to sign in.", request.username));
    Ok(())
}

pub async fn run_whoami(json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    if !ctx.auth_service.is_authenticated()? {
        anyhow::bail!("Not logged in. Run `ft login` first.");
    }

    let profile = ctx.auth_service.profile().await?;

    if json {
        return output::print_json(&profile);
    }

    println!("{}", "Profile".bold());
    println!("  Username:   {}", profile.username.as_deref().unwrap_or("-"));
    println!("  Email:      {}", profile.email.as_deref().unwrap_or("-"));
    println!("  ID:         {}", profile.id.as_deref().unwrap_or("-"));
    println!("  Last login: {}", profile.last_login.as_deref().unwrap_or("-"));
    Ok(())
}
