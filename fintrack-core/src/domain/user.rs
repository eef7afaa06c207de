//! User profile model

use serde::{Deserialize, Serialize};

use super::de;

/// The logged-in user as returned by `/users/api/me/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "de::optional_id")]
    pub id: Option<String>,
    #[serde(default, alias = "userName")]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// ISO 8601 timestamp string
    #[serde(default, alias = "lastLogin")]
    pub last_login: Option<String>,
}

/// Payload for `POST /users/register/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}
