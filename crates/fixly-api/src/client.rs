// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilient HTTP client for the platform API.
//!
//! Every call attaches the stored bearer credential when one exists. A 401
//! triggers at most one credential renewal followed by one replay; renewal
//! is single-flight: concurrent 401s park behind one async mutex and adopt
//! the winner's fresh pair instead of renewing again. A renewal failure is
//! terminal: credentials are cleared and the session channel flips to
//! `Expired` so the UI can route to login. Consumers must not layer their
//! own retry-on-401 logic on top.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use fixly_core::{CredentialPair, FixlyError, KeyValueStore, SessionState};

use crate::auth::CredentialStore;
use crate::envelope;

/// Fixed ceiling on every outbound call. Exceeding it is a generic request
/// failure, not distinguished from a network error.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const LOGIN_PATH: &str = "/auth/login";
const REFRESH_PATH: &str = "/auth/refresh";

/// HTTP client with transparent credential renewal.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
    /// Guards the renewal critical section. Holding it and re-checking the
    /// stored pair is what makes renewal single-flight.
    refresh_lock: Arc<Mutex<()>>,
    session_tx: Arc<watch::Sender<SessionState>>,
}

impl ApiClient {
    /// Build a client against `base_url` with the default request timeout.
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, FixlyError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT, store)
    }

    /// Build a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, FixlyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FixlyError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        let (session_tx, _session_rx) = watch::channel(SessionState::Active);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: CredentialStore::new(store),
            refresh_lock: Arc::new(Mutex::new(())),
            session_tx: Arc::new(session_tx),
        })
    }

    /// Subscribe to session-state changes. Flips to `Expired` exactly when a
    /// credential renewal fails terminally; the UI layer observes that and
    /// navigates to login.
    pub fn session(&self) -> watch::Receiver<SessionState> {
        self.session_tx.subscribe()
    }

    /// Access the credential store (login status checks, diagnostics).
    pub fn credential_store(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Authenticate and persist the issued credential pair.
    ///
    /// Goes through [`Self::send`] directly: a 401 here means wrong
    /// credentials, never an expired token, so the renewal path must not run.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), FixlyError> {
        let body = json!({"email": email, "password": password});
        let response = self
            .send(Method::POST, LOGIN_PATH, None, Some(&body), None)
            .await?;
        let value = Self::into_json(response).await?;
        let pair: CredentialPair = envelope::unwrap_as(value)?;
        self.credentials.save(&pair).await;
        let _ = self.session_tx.send(SessionState::Active);
        debug!("login succeeded; credential pair stored");
        Ok(())
    }

    /// Discard the stored credential pair.
    pub async fn logout(&self) {
        self.credentials.clear().await;
        debug!("logged out; credentials cleared");
    }

    pub async fn get(&self, path: &str) -> Result<Value, FixlyError> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, FixlyError> {
        self.request(Method::GET, path, Some(query), None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, FixlyError> {
        self.request(Method::POST, path, None, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, FixlyError> {
        self.request(Method::PUT, path, None, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, FixlyError> {
        self.request(Method::DELETE, path, None, None).await
    }

    /// Issue a call with the stored bearer credential, renewing and
    /// replaying once on 401.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> Result<Value, FixlyError> {
        let token = self.credentials.load().await.map(|p| p.access_token);
        let response = self
            .send(method.clone(), path, query, body, token.as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::into_json(response).await;
        }

        // One renewal, one replay. A second 401 propagates.
        let fresh = self.renew_access_token(token.as_deref()).await?;
        let replay = self.send(method, path, query, body, Some(&fresh)).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            return Err(FixlyError::Unauthorized);
        }
        Self::into_json(replay).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, FixlyError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| FixlyError::Api {
            message: format!("request failed: {e}"),
            source: Some(Box::new(e)),
        })
    }

    async fn into_json(response: reqwest::Response) -> Result<Value, FixlyError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FixlyError::Api {
                message: format!("server returned {status}: {body}"),
                source: None,
            });
        }
        let body = response.text().await.map_err(|e| FixlyError::Api {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(FixlyError::decode)
    }

    /// Renew the credential pair, single-flight.
    ///
    /// `stale` is the access token the caller's failed request carried.
    /// After acquiring the lock the stored pair is re-read: if it no longer
    /// matches, a concurrent caller already renewed and this one adopts the
    /// fresh token without issuing a second renewal request.
    async fn renew_access_token(&self, stale: Option<&str>) -> Result<String, FixlyError> {
        let _guard = self.refresh_lock.lock().await;

        let pair = match self.credentials.load().await {
            Some(pair) => pair,
            None => {
                // Either this caller was never authenticated, or a renewal
                // that failed while we waited already tore the session down.
                if *self.session_tx.borrow() == SessionState::Expired {
                    return Err(FixlyError::SessionExpired {
                        message: "credential renewal failed".to_string(),
                    });
                }
                return Err(FixlyError::Unauthorized);
            }
        };
        if stale != Some(pair.access_token.as_str()) {
            debug!("adopting credentials renewed by a concurrent caller");
            return Ok(pair.access_token);
        }

        let body = json!({"refreshToken": pair.refresh_token});
        let result = async {
            let response = self
                .send(Method::POST, REFRESH_PATH, None, Some(&body), None)
                .await?;
            let value = Self::into_json(response).await?;
            envelope::unwrap_as::<CredentialPair>(value)
        }
        .await;

        match result {
            Ok(fresh) => {
                self.credentials.save(&fresh).await;
                debug!("credential pair renewed");
                Ok(fresh.access_token)
            }
            Err(err) => {
                warn!(error = %err, "credential renewal failed; ending session");
                self.credentials.clear().await;
                let _ = self.session_tx.send(SessionState::Expired);
                Err(FixlyError::SessionExpired {
                    message: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use fixly_storage::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_with_tokens(
        server: &MockServer,
        access: &str,
        refresh: &str,
    ) -> (ApiClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new(server.uri(), store.clone()).unwrap();
        client
            .credential_store()
            .save(&CredentialPair {
                access_token: access.to_string(),
                refresh_token: refresh.to_string(),
            })
            .await;
        (client, store)
    }

    fn refresh_success(access: &str, refresh: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "data": {"accessToken": access, "refreshToken": refresh}
        }))
    }

    #[tokio::test]
    async fn attaches_bearer_header_when_credentials_exist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(header("authorization", "Bearer tokA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_with_tokens(&server, "tokA", "refA").await;
        let value = client.get("/jobs").await.unwrap();
        assert_eq!(value, json!({"data": []}));
    }

    #[tokio::test]
    async fn proceeds_unauthenticated_when_no_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryStore::new())).unwrap();
        assert!(client.get("/categories").await.is_ok());
    }

    #[tokio::test]
    async fn unauthenticated_401_propagates_without_renewal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(refresh_success("tokB", "refB"))
            .expect(0)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryStore::new())).unwrap();
        let err = client.get("/jobs").await.unwrap_err();
        assert!(matches!(err, FixlyError::Unauthorized));
    }

    #[tokio::test]
    async fn renews_and_replays_once_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(header("authorization", "Bearer tokA"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(header("authorization", "Bearer tokB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "j-1"}]})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({"refreshToken": "refA"})))
            .respond_with(refresh_success("tokB", "refB"))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_with_tokens(&server, "tokA", "refA").await;
        let value = client.get("/jobs").await.unwrap();
        assert_eq!(value["data"][0]["id"], "j-1");

        // The rotated pair replaced the stored one.
        let stored = client.credential_store().load().await.unwrap();
        assert_eq!(stored.access_token, "tokB");
        assert_eq!(stored.refresh_token, "refB");
    }

    #[tokio::test]
    async fn concurrent_401s_share_a_single_renewal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(header("authorization", "Bearer tokA"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(header("authorization", "Bearer tokB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(refresh_success("tokB", "refB"))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_with_tokens(&server, "tokA", "refA").await;
        let (first, second) = tokio::join!(client.get("/jobs"), client.get("/jobs"));
        assert!(first.is_ok(), "first caller failed: {first:?}");
        assert!(second.is_ok(), "second caller failed: {second:?}");
    }

    #[tokio::test]
    async fn replay_401_propagates_instead_of_looping() {
        let server = MockServer::start().await;
        // Unauthorized no matter which token is presented.
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(refresh_success("tokB", "refB"))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_with_tokens(&server, "tokA", "refA").await;
        let err = client.get("/jobs").await.unwrap_err();
        assert!(matches!(err, FixlyError::Unauthorized));
    }

    #[tokio::test]
    async fn renewal_failure_clears_credentials_and_expires_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "bad token"})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _store) = client_with_tokens(&server, "tokA", "refA").await;
        let session = client.session();
        assert_eq!(*session.borrow(), SessionState::Active);

        let err = client.get("/jobs").await.unwrap_err();
        assert!(matches!(err, FixlyError::SessionExpired { .. }));
        assert_eq!(client.credential_store().load().await, None);
        assert_eq!(*session.borrow(), SessionState::Expired);
    }

    #[tokio::test]
    async fn non_401_errors_pass_through_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(refresh_success("tokB", "refB"))
            .expect(0)
            .mount(&server)
            .await;

        let (client, _store) = client_with_tokens(&server, "tokA", "refA").await;
        let err = client.get("/jobs").await.unwrap_err();
        match err {
            FixlyError::Api { message, .. } => assert!(message.contains("500"), "got: {message}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_stores_pair_and_logout_clears_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "a@b.c", "password": "hunter2"})))
            .respond_with(refresh_success("tokA", "refA"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryStore::new())).unwrap();
        client.login("a@b.c", "hunter2").await.unwrap();
        assert!(client.credential_store().load().await.is_some());

        client.logout().await;
        assert_eq!(client.credential_store().load().await, None);
    }

    #[tokio::test]
    async fn empty_body_decodes_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/jobs/j-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(client.delete("/jobs/j-1").await.unwrap(), Value::Null);
    }
}
