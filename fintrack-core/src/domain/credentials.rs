//! Credential pair held by the credential store

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access and refresh tokens as stored on this device
///
/// Persisted as `{"access_token": ..., "refresh_token": ...}`. A refresh
/// token may exist without an access token (stale state). After a
/// successful login both are present.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
        }
    }

    /// No tokens at all
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// Token values never show up in logs or panics
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |t: &Option<String>| t.as_ref().map(|_| "<redacted>");
        f.debug_struct("CredentialPair")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = CredentialPair::new("A1", Some("R1".to_string()));
        let printed = format!("{:?}", pair);
        assert!(!printed.contains("A1"));
        assert!(!printed.contains("R1"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_stale_state() {
        let pair = CredentialPair {
            access_token: None,
            refresh_token: Some("R1".to_string()),
        };
        assert!(!pair.is_empty());
        assert!(!pair.has_access_token());
        assert!(pair.has_refresh_token());
    }

    #[test]
    fn test_serialized_layout() {
        let pair = CredentialPair::new("A1", None);
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json, serde_json::json!({ "access_token": "A1" }));

        let parsed: CredentialPair =
            serde_json::from_str(r#"{"access_token":"A1","refresh_token":"R1"}"#).unwrap();
        assert_eq!(parsed.refresh_token.as_deref(), Some("R1"));
    }
}
