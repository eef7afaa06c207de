//! Bank link service - connect institutions through the server's Plaid endpoints
//!
//! The client never talks to Plaid directly. It asks the server for a link
//! token, the user completes Link elsewhere, and the resulting public token
//! is handed back to the server for exchange.

use std::sync::Arc;

use serde::Serialize;

use crate::adapters::ApiClient;
use crate::domain::result::{Error, Result};
use crate::domain::{ParsedBody, RequestOptions};

const LINK_TOKEN_PATH: &str = "/plaid/link-token/";
const EXCHANGE_PATH: &str = "/plaid/exchange-public-token/";

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    public_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    institution_name: Option<&'a str>,
}

pub struct BankLinkService {
    client: Arc<ApiClient>,
}

impl BankLinkService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Ask the server for a Plaid Link token
    pub async fn create_link_token(&self) -> Result<String> {
        let body = self
            .client
            .request(LINK_TOKEN_PATH, &RequestOptions::post())
            .await?;
        body.get("link_token")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::invalid_response("reply has no link_token"))
    }

    /// Hand a public token back to the server
    pub async fn exchange_public_token(
        &self,
        public_token: &str,
        institution_name: Option<&str>,
    ) -> Result<ParsedBody> {
        if public_token.trim().is_empty() {
            return Err(Error::validation("Public token is required"));
        }
        let request = ExchangeRequest {
            public_token: public_token.trim(),
            institution_name,
        };
        self.client.post_json(EXCHANGE_PATH, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_api::{MockApiServer, MockResponse};
    use crate::adapters::MemoryCredentialStore;
    use serde_json::json;

    fn service(server: &MockApiServer) -> BankLinkService {
        let store = Arc::new(MemoryCredentialStore::with_tokens(Some("A1"), Some("R1")));
        let client = ApiClient::new(&server.base_url(), store).unwrap();
        BankLinkService::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_create_link_token() {
        let server = MockApiServer::start().unwrap();
        server.respond(
            "POST",
            "/plaid/link-token/",
            MockResponse::json(200, json!({ "link_token": "link-sandbox-123" })),
        );

        let token = service(&server).create_link_token().await.unwrap();
        assert_eq!(token, "link-sandbox-123");
        assert_eq!(server.requests()[0].header("authorization"), Some("Bearer A1"));
    }

    #[tokio::test]
    async fn test_link_token_missing() {
        let server = MockApiServer::start().unwrap();
        server.respond("POST", "/plaid/link-token/", MockResponse::json(200, json!({})));

        let err = service(&server).create_link_token().await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_exchange_public_token() {
        let server = MockApiServer::start().unwrap();
        server.respond(
            "POST",
            "/plaid/exchange-public-token/",
            MockResponse::json(200, json!({ "status": "ok" })),
        );

        let body = service(&server)
            .exchange_public_token("public-sandbox-1", Some("First Platypus Bank"))
            .await
            .unwrap();
        assert_eq!(body.get("status"), Some(&json!("ok")));

        assert_eq!(
            server.requests()[0].json_body(),
            Some(json!({
                "public_token": "public-sandbox-1",
                "institution_name": "First Platypus Bank"
            }))
        );
    }
}
