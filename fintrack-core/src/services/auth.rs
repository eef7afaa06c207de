//! Auth service - login, registration and session state

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::ApiClient;
use crate::domain::result::{Error, Result};
use crate::domain::{ParsedBody, Profile, RegisterRequest, RequestOptions};

const LOGIN_PATH: &str = "/token/";
const REGISTER_PATH: &str = "/users/register/";
const PROFILE_PATH: &str = "/users/api/me/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Auth service for session management
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Obtain a token pair and store it
    ///
    /// Sent without credentials, so a wrong password never triggers a
    /// refresh of a stale session.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::validation("Username and password are required"));
        }

        let options = RequestOptions::post().json(&LoginRequest { username, password })?;
        let body = self.client.request_anonymous(LOGIN_PATH, &options).await?;

        let access = string_field(&body, "access")
            .ok_or_else(|| Error::invalid_response("login reply has no access token"))?;
        let refresh = string_field(&body, "refresh");

        self.client.credentials().set(access, refresh)
    }

    /// Create an account; does not log in
    pub async fn register(&self, request: &RegisterRequest) -> Result<ParsedBody> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(Error::validation("Username and password are required"));
        }
        let options = RequestOptions::post().json(request)?;
        self.client.request_anonymous(REGISTER_PATH, &options).await
    }

    /// Forget both tokens
    pub fn logout(&self) -> Result<()> {
        self.client.credentials().clear()
    }

    /// Whether an access token is stored
    ///
    /// Says nothing about whether the server still accepts it.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.client.credentials().get()?.has_access_token())
    }

    /// The logged-in user
    pub async fn profile(&self) -> Result<Profile> {
        self.client
            .request_json(PROFILE_PATH, &RequestOptions::get())
            .await
    }
}

fn string_field<'a>(body: &'a ParsedBody, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
