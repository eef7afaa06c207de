//! Authenticated HTTP client for the FinTrack API
//!
//! Every call attaches the stored access token as a Bearer header. When
//! the server answers 401 the client exchanges the refresh token at
//! `/token/refresh/` and replays the request exactly once. The response
//! body comes back as parsed JSON, or as raw text when it is not JSON.
//!
//! Credentials are read from and written to an injected `CredentialStore`,
//! so the same client works against a file, a keychain, or memory.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::{normalize_base_url, Config};
use crate::domain::result::{Error, Result};
use crate::domain::{ParsedBody, RequestOptions};
use crate::ports::CredentialStore;
use crate::services::event_log::{EventKind, EventLog, LogEvent};

const REFRESH_PATH: &str = "/token/refresh/";
const JSON_CONTENT_TYPE: &str = "application/json";

/// FinTrack API client
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    /// Present when concurrent 401s should share a single refresh call
    refresh_guard: Option<Mutex<()>>,
    event_log: Option<Arc<EventLog>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("single_flight", &self.refresh_guard.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (for example `http://127.0.0.1:8000/api`)
    pub fn new(base_url: &str, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::with_timeout(base_url, store, None)
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let client = Self::with_timeout(&config.api_base, store, config.timeout)?;
        Ok(client.with_single_flight(config.single_flight_refresh))
    }

    fn with_timeout(
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = normalize_base_url(base_url).map_err(|e| Error::Config(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            store,
            refresh_guard: None,
            event_log: None,
        })
    }

    /// Record refresh and failure events in the event log
    pub fn with_event_log(mut self, log: Arc<EventLog>) -> Self {
        self.event_log = Some(log);
        self
    }

    /// Enable or disable single-flight refresh
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.refresh_guard = enabled.then(|| Mutex::new(()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store this client reads and updates
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Perform an authenticated request
    ///
    /// At most one refresh and one retry happen per call. A 401 on the
    /// retry is reported as `RequestFailed`, not refreshed again.
    pub async fn request(&self, path: &str, options: &RequestOptions) -> Result<ParsedBody> {
        let access = self.stored_access().await?;
        let mut response = self.send(path, options, access.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let fresh = self.refresh_after_rejection(access.as_deref()).await?;
            response = self.send(path, options, Some(&fresh)).await?;
        }

        self.finish(path, response).await
    }

    /// Perform a request without credentials (login, registration)
    ///
    /// Sends no Authorization header and never refreshes.
    pub async fn request_anonymous(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<ParsedBody> {
        let response = self.send(path, options, None).await?;
        self.finish(path, response).await
    }

    pub async fn get(&self, path: &str) -> Result<ParsedBody> {
        self.request(path, &RequestOptions::get()).await
    }

    pub async fn post(&self, path: &str, body: impl Into<String>) -> Result<ParsedBody> {
        self.request(path, &RequestOptions::post().body(body)).await
    }

    /// POST `value` serialized as JSON
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<ParsedBody> {
        let options = RequestOptions::post().json(value)?;
        self.request(path, &options).await
    }

    /// Authenticated request whose JSON body is deserialized into `T`
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T> {
        self.request(path, options).await?.deserialize()
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// On success the new access token is stored and the refresh token is
    /// kept. A missing refresh token or a rejected exchange clears the
    /// store and yields `SessionExpired`. A successful exchange without an
    /// `access` string yields `InvalidRefreshResponse` and leaves the store
    /// untouched.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let stored = self.with_store(|store| store.get()).await?;
        let Some(refresh) = stored.refresh_token.filter(|t| !t.is_empty()) else {
            return self.expire_session(None).await;
        };

        let body = serde_json::json!({ "refresh": refresh }).to_string();
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        // A rejection ends the session whatever the body looks like
        if !status.is_success() {
            return self.expire_session(Some(status)).await;
        }

        let text = response.text().await?;
        let access = match ParsedBody::parse(text).get("access") {
            Some(serde_json::Value::String(token)) if !token.is_empty() => token.clone(),
            _ => {
                self.record(
                    LogEvent::new(EventKind::RefreshInvalidResponse)
                        .with_endpoint(REFRESH_PATH)
                        .with_status(status.as_u16()),
                );
                return Err(Error::InvalidRefreshResponse);
            }
        };

        let stored_access = access.clone();
        self.with_store(move |store| store.set(&stored_access, None))
            .await?;
        self.record(
            LogEvent::new(EventKind::TokenRefreshed)
                .with_endpoint(REFRESH_PATH)
                .with_status(status.as_u16()),
        );
        Ok(access)
    }

    /// Get a usable access token after `rejected` drew a 401
    async fn refresh_after_rejection(&self, rejected: Option<&str>) -> Result<String> {
        let Some(guard) = &self.refresh_guard else {
            return self.refresh_access_token().await;
        };

        let _held = guard.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(current) = self.stored_access().await? {
            if Some(current.as_str()) != rejected {
                return Ok(current);
            }
        }
        self.refresh_access_token().await
    }

    /// Stored access token; an empty string counts as none
    async fn stored_access(&self) -> Result<Option<String>> {
        let stored = self.with_store(|store| store.get()).await?;
        Ok(stored.access_token.filter(|t| !t.is_empty()))
    }

    /// Run a store operation on the blocking pool
    ///
    /// A file-backed store may wait on another process's lock.
    async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CredentialStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| Error::storage(format!("Credential store task failed: {}", e)))?
    }

    async fn expire_session<T>(&self, status: Option<StatusCode>) -> Result<T> {
        self.with_store(|store| store.clear()).await?;
        let mut event = LogEvent::new(EventKind::SessionExpired).with_endpoint(REFRESH_PATH);
        if let Some(status) = status {
            event = event.with_status(status.as_u16());
        }
        self.record(event);
        Err(Error::SessionExpired)
    }

    async fn send(
        &self,
        path: &str,
        options: &RequestOptions,
        access: Option<&str>,
    ) -> Result<Response> {
        let mut request = self.http.request(options.method.clone(), self.url(path));

        for (name, value) in &options.headers {
            // A stored token always wins over a caller-supplied one
            if access.is_some() && name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &options.body {
            if !options.has_header(CONTENT_TYPE.as_str()) {
                request = request.header(CONTENT_TYPE, JSON_CONTENT_TYPE);
            }
            request = request.body(body.clone());
        }

        if let Some(token) = access {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        Ok(request.send().await?)
    }

    async fn finish(&self, path: &str, response: Response) -> Result<ParsedBody> {
        let status = response.status();
        let body = ParsedBody::parse(response.text().await?);

        if status.is_success() {
            return Ok(body);
        }

        let message = body.error_message(status);
        self.record(
            LogEvent::new(EventKind::RequestFailed)
                .with_endpoint(path)
                .with_status(status.as_u16())
                .with_error(message.clone()),
        );
        Err(Error::RequestFailed { message, status })
    }

    /// Best effort; a broken event log never fails a request
    fn record(&self, event: LogEvent) {
        if let Some(log) = &self.event_log {
            let _ = log.record(&event);
        }
    }
}

/// Convenience for callers building non-GET requests by method name
pub fn method_from_str(method: &str) -> Result<Method> {
    Method::from_bytes(method.trim().to_uppercase().as_bytes())
        .map_err(|_| Error::validation(format!("Invalid HTTP method: {}", method)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryCredentialStore;
    use crate::adapters::mock_api::{MockApiServer, MockResponse};
    use serde_json::json;

    fn client_for(server: &MockApiServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
        ApiClient::new(&server.base_url(), store).unwrap()
    }

    fn tokens(access: Option<&str>, refresh: Option<&str>) -> Arc<MemoryCredentialStore> {
        Arc::new(MemoryCredentialStore::with_tokens(access, refresh))
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::json(200, json!({ "results": [] })));

        let client = client_for(&server, tokens(Some("A1"), Some("R1")));
        let body = client.get("/accounts/").await.unwrap();

        assert_eq!(body, ParsedBody::Json(json!({ "results": [] })));
        let seen = server.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].header("authorization"), Some("Bearer A1"));
        assert_eq!(seen[0].header("content-type"), None);
    }

    #[tokio::test]
    async fn test_refreshes_once_and_retries() {
        let server = MockApiServer::start().unwrap();
        server
            .respond("GET", "/accounts/", MockResponse::unauthorized())
            .respond("GET", "/accounts/", MockResponse::json(200, json!([{ "id": 1 }])));
        server.respond("POST", "/token/refresh/", MockResponse::json(200, json!({ "access": "A2" })));

        let store = tokens(Some("A1"), Some("R1"));
        let client = client_for(&server, store.clone());
        let body = client.get("/accounts/").await.unwrap();
        assert_eq!(body, ParsedBody::Json(json!([{ "id": 1 }])));

        let seen = server.requests();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].header("authorization"), Some("Bearer A1"));
        assert_eq!(seen[1].path, "/token/refresh/");
        assert_eq!(seen[1].json_body(), Some(json!({ "refresh": "R1" })));
        assert_eq!(seen[1].header("authorization"), None);
        assert_eq!(seen[2].header("authorization"), Some("Bearer A2"));

        let pair = store.get().unwrap();
        assert_eq!(pair.access_token.as_deref(), Some("A2"));
        assert_eq!(pair.refresh_token.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_401_without_tokens_expires_session() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());

        let client = client_for(&server, tokens(None, None));
        let err = client.get("/accounts/").await.unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(err.to_string(), "Session expired, please log in again");
        assert!(server.requests_to("/token/refresh/").is_empty());
        assert_eq!(server.requests()[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_401_without_refresh_token_clears_access() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());

        let store = tokens(Some("EXPIRED"), None);
        let client = client_for(&server, store.clone());
        let err = client.get("/accounts/").await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(store.get().unwrap().is_empty());
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_tokens_count_as_absent() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());

        let store = tokens(Some(""), Some(""));
        let client = client_for(&server, store.clone());
        let err = client.get("/accounts/").await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(store.get().unwrap().is_empty());
        assert_eq!(server.requests()[0].header("authorization"), None);
        assert!(server.requests_to("/token/refresh/").is_empty());
    }

    #[tokio::test]
    async fn test_rejected_refresh_with_broken_body_clears_credentials() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());
        server.respond(
            "POST",
            "/token/refresh/",
            MockResponse::text(401, r#"{"detail""#).truncated(500),
        );

        let store = tokens(Some("A1"), Some("R1"));
        let client = client_for(&server, store.clone());
        let err = client.get("/accounts/").await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(store.get().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_locked_credential_file_is_storage_error() {
        use crate::adapters::file_store::FileCredentialStore;
        use fs2::FileExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path())
            .unwrap()
            .with_lock_timeout(Duration::from_millis(60));
        store.set("A1", Some("R1")).unwrap();

        let holder = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.path().join("credentials.lock"))
            .unwrap();
        holder.lock_exclusive().unwrap();

        let server = MockApiServer::start().unwrap();
        let client = ApiClient::new(&server.base_url(), Arc::new(store)).unwrap();
        let err = client.get("/accounts/").await.unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_credentials() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());
        server.respond("POST", "/token/refresh/", MockResponse::unauthorized());

        let store = tokens(Some("A1"), Some("R1"));
        let client = client_for(&server, store.clone());
        let err = client.get("/accounts/").await.unwrap_err();

        assert!(matches!(err, Error::SessionExpired));
        assert!(store.get().unwrap().is_empty());
        // No retry after a failed refresh
        assert_eq!(server.requests_to("/accounts/").len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_access_is_invalid() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());
        server.respond("POST", "/token/refresh/", MockResponse::json(200, json!({ "token": "x" })));

        let store = tokens(Some("A1"), Some("R1"));
        let client = client_for(&server, store.clone());
        let err = client.get("/accounts/").await.unwrap_err();

        assert!(matches!(err, Error::InvalidRefreshResponse));
        assert_eq!(err.to_string(), "Invalid refresh response");
        let pair = store.get().unwrap();
        assert_eq!(pair.access_token.as_deref(), Some("A1"));
        assert_eq!(pair.refresh_token.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_refresh_with_text_body_is_invalid() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());
        server.respond("POST", "/token/refresh/", MockResponse::text(200, "ok"));

        let client = client_for(&server, tokens(Some("A1"), Some("R1")));
        let err = client.get("/accounts/").await.unwrap_err();
        assert!(matches!(err, Error::InvalidRefreshResponse));
    }

    #[tokio::test]
    async fn test_non_json_body_returned_verbatim() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/health/", MockResponse::text(200, "pong"));

        let client = client_for(&server, tokens(Some("A1"), None));
        let body = client.get("/health/").await.unwrap();
        assert_eq!(body, ParsedBody::Text("pong".to_string()));
    }

    #[tokio::test]
    async fn test_second_401_is_final() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());
        server.respond("POST", "/token/refresh/", MockResponse::json(200, json!({ "access": "A2" })));

        let client = client_for(&server, tokens(Some("A1"), Some("R1")));
        let err = client.get("/accounts/").await.unwrap_err();

        match err {
            Error::RequestFailed { message, status } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Given token not valid for any token type");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(server.requests_to("/token/refresh/").len(), 1);
        assert_eq!(server.requests_to("/accounts/").len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::text(500, "Internal Server Error"));

        let client = client_for(&server, tokens(Some("A1"), Some("R1")));
        let err = client.get("/accounts/").await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.to_string(), "Internal Server Error");
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_body_sets_json_content_type() {
        let server = MockApiServer::start().unwrap();
        server.respond("POST", "/accounts/", MockResponse::json(201, json!({ "id": 5 })));

        let client = client_for(&server, tokens(Some("A1"), None));
        client.post_json("/accounts/", &json!({ "accountName": "Cash" })).await.unwrap();

        let seen = server.requests();
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
        assert_eq!(seen[0].json_body(), Some(json!({ "accountName": "Cash" })));
    }

    #[tokio::test]
    async fn test_caller_content_type_respected() {
        let server = MockApiServer::start().unwrap();
        server.respond("POST", "/import/", MockResponse::json(200, json!({})));

        let client = client_for(&server, tokens(Some("A1"), None));
        let options = RequestOptions::post()
            .header("Content-Type", "text/csv")
            .body("date,amount\n");
        client.request("/import/", &options).await.unwrap();

        let seen = server.requests();
        assert_eq!(seen[0].header("content-type"), Some("text/csv"));
        assert_eq!(seen[0].body, "date,amount\n");
    }

    #[tokio::test]
    async fn test_stored_token_overrides_caller_authorization() {
        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/users/api/me/", MockResponse::json(200, json!({})));

        let client = client_for(&server, tokens(Some("A1"), None));
        let options = RequestOptions::get().header("Authorization", "Bearer other");
        client.request("/users/api/me/", &options).await.unwrap();

        let seen = server.requests();
        let auth: Vec<_> = seen[0]
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].1, "Bearer A1");
    }

    #[tokio::test]
    async fn test_anonymous_request_never_refreshes() {
        let server = MockApiServer::start().unwrap();
        server.respond(
            "POST",
            "/token/",
            MockResponse::json(401, json!({ "detail": "No active account found with the given credentials" })),
        );

        let store = tokens(Some("A1"), Some("R1"));
        let client = client_for(&server, store.clone());
        let options = RequestOptions::post()
            .json(&json!({ "username": "u", "password": "bad" }))
            .unwrap();
        let err = client.request_anonymous("/token/", &options).await.unwrap_err();

        assert_eq!(err.to_string(), "No active account found with the given credentials");
        assert_eq!(server.requests().len(), 1);
        assert_eq!(server.requests()[0].header("authorization"), None);
        assert!(!store.get().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_flight_shares_one_refresh() {
        let server = MockApiServer::start().unwrap();
        server
            .respond("GET", "/accounts/", MockResponse::unauthorized())
            .respond("GET", "/accounts/", MockResponse::unauthorized())
            .respond("GET", "/accounts/", MockResponse::json(200, json!([])));
        server.respond(
            "POST",
            "/token/refresh/",
            MockResponse::json(200, json!({ "access": "A2" })).with_delay(200),
        );

        let store = tokens(Some("A1"), Some("R1"));
        let client = client_for(&server, store.clone()).with_single_flight(true);

        let (first, second) = tokio::join!(client.get("/accounts/"), client.get("/accounts/"));
        assert!(first.is_ok());
        assert!(second.is_ok());

        assert_eq!(server.requests_to("/token/refresh/").len(), 1);
        let retries: Vec<_> = server
            .requests_to("/accounts/")
            .into_iter()
            .filter(|r| r.header("authorization") == Some("Bearer A2"))
            .collect();
        assert_eq!(retries.len(), 2);
        assert_eq!(store.get().unwrap().access_token.as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(
            &format!("http://127.0.0.1:{}", port),
            tokens(Some("A1"), Some("R1")),
        )
        .unwrap();

        let err = client.get("/accounts/").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_events_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(
            EventLog::open(dir.path(), crate::services::Source::Library, "test").unwrap(),
        );

        let server = MockApiServer::start().unwrap();
        server
            .respond("GET", "/accounts/", MockResponse::unauthorized())
            .respond("GET", "/accounts/", MockResponse::text(502, ""));
        server.respond("POST", "/token/refresh/", MockResponse::json(200, json!({ "access": "A2" })));

        let client = client_for(&server, tokens(Some("A1"), Some("R1"))).with_event_log(log.clone());
        let err = client.get("/accounts/?page=2").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502");

        let summary = log.summary().unwrap();
        assert_eq!(summary.refreshes, 1);
        assert_eq!(summary.failed_requests, 1);

        let failures = log.failures_by_endpoint(10).unwrap();
        assert_eq!(failures[0].endpoint, "/accounts/");
        assert_eq!(failures[0].status, Some(502));
    }

    #[tokio::test]
    async fn test_expired_session_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(
            EventLog::open(dir.path(), crate::services::Source::Library, "test").unwrap(),
        );

        let server = MockApiServer::start().unwrap();
        server.respond("GET", "/accounts/", MockResponse::unauthorized());
        server.respond("POST", "/token/refresh/", MockResponse::unauthorized());

        let client = client_for(&server, tokens(Some("A1"), Some("R1"))).with_event_log(log.clone());
        assert!(client.get("/accounts/").await.unwrap_err().is_session_expired());

        let expired = log
            .recent(&crate::services::EventFilter::latest(10).kind(EventKind::SessionExpired))
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].endpoint.as_deref(), Some("/token/refresh/"));
        assert_eq!(expired[0].status, Some(401));
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = ApiClient::new("nope", tokens(None, None)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(method_from_str("patch").unwrap(), Method::PATCH);
        assert!(method_from_str("BAD METHOD").is_err());
    }
}
