//! Firebase Authentication over the Identity Toolkit REST API.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use core_auth::{
    BackendAuthClient, BackendError, BackendResult, Identity, ProviderCredential, ProviderKind,
    SessionChannel, SessionSubscription,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::FirebaseConfig;
use crate::error::{FirebaseError, Result};
use crate::types::{
    ErrorBody, SignInWithIdpRequest, SignInWithIdpResponse, UpdateAccountRequest,
    UpdateAccountResponse,
};

/// Supplies the signed-in user's id token to other Firebase services.
#[async_trait]
pub trait IdTokenSource: Send + Sync {
    async fn id_token(&self) -> Option<String>;
}

struct SessionTokens {
    id_token: String,
    refresh_token: Option<String>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Backend auth client for Firebase Authentication.
///
/// Session tokens live in memory only. Subscribers are notified on sign-in
/// and sign-out; a display name update only refreshes the stored identity.
pub struct FirebaseAuthClient {
    http_client: Arc<dyn HttpClient>,
    config: FirebaseConfig,
    tokens: RwLock<Option<SessionTokens>>,
    session: SessionChannel,
}

impl FirebaseAuthClient {
    pub fn new(http_client: Arc<dyn HttpClient>, config: FirebaseConfig) -> Self {
        Self {
            http_client,
            config,
            tokens: RwLock::new(None),
            session: SessionChannel::default(),
        }
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    async fn post<B>(&self, method: &str, body: &B, policy: RetryPolicy) -> Result<HttpResponse>
    where
        B: Serialize + Sync,
    {
        let request = HttpRequest::new(HttpMethod::Post, self.config.identity_toolkit_url(method))
            .json(body)?
            .timeout(self.config.request_timeout);

        let response = self.http_client.execute_with_retry(request, policy).await?;
        if response.is_success() {
            return Ok(response);
        }

        let message = ErrorBody::from_response(&response)
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP_{}", response.status));

        warn!(
            method,
            status = response.status,
            error_code = %message,
            "Identity Toolkit request failed"
        );
        Err(FirebaseError::identity_toolkit(response.status, &message))
    }

    #[instrument(skip(self, credential), fields(provider = %credential.provider()))]
    async fn exchange(&self, credential: ProviderCredential) -> Result<Option<Identity>> {
        let provider = credential.provider();
        // Apple hands out an authorization code where Google has an access token.
        let access_key = match provider {
            ProviderKind::Google => "access_token",
            ProviderKind::Apple => "code",
        };

        let mut form: Vec<(&str, &str)> = Vec::with_capacity(3);
        if let Some(token) = credential.id_token() {
            form.push(("id_token", token));
        }
        if let Some(token) = credential.access_token() {
            form.push((access_key, token));
        }
        form.push(("providerId", provider.provider_id()));

        let post_body =
            serde_urlencoded::to_string(&form).map_err(|e| FirebaseError::Parse(e.to_string()))?;

        let request = SignInWithIdpRequest {
            post_body,
            request_uri: &self.config.request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };

        // Provider tokens may be single-use, so the exchange is never replayed.
        let response = self
            .post("signInWithIdp", &request, RetryPolicy::no_retry())
            .await?;

        let body: SignInWithIdpResponse = response
            .json()
            .map_err(|e| FirebaseError::Parse(e.to_string()))?;

        if let Some(message) = body.error_message.as_deref().filter(|m| !m.is_empty()) {
            warn!(error_code = %message, "Identity Toolkit reported an IdP error");
            return Err(FirebaseError::identity_toolkit(response.status, message));
        }

        if body.need_confirmation == Some(true) {
            warn!("Account exists with a different provider");
            return Err(FirebaseError::identity_toolkit(
                response.status,
                "NEED_CONFIRMATION",
            ));
        }

        let local_id = body.local_id.filter(|id| !id.is_empty());
        let (local_id, id_token) = match (local_id, body.id_token) {
            (Some(local_id), Some(id_token)) => (local_id, id_token),
            _ => {
                warn!("signInWithIdp returned no user");
                return Ok(None);
            }
        };

        *self.tokens.write().await = Some(SessionTokens {
            id_token,
            refresh_token: body.refresh_token,
        });

        let identity = Identity {
            id: local_id,
            email: body.email,
            display_name: body.display_name,
        };

        info!(user_id = %identity.id, "Firebase session established");
        self.session.publish(Some(identity.clone()));

        Ok(Some(identity))
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, display_name: &str) -> Result<Identity> {
        let id_token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|tokens| tokens.id_token.clone())
            .ok_or(FirebaseError::NotSignedIn)?;
        let current = self.session.current().ok_or(FirebaseError::NotSignedIn)?;

        let request = UpdateAccountRequest {
            id_token: &id_token,
            display_name,
            return_secure_token: true,
        };

        let response = self
            .post("update", &request, RetryPolicy::default())
            .await?;

        let body: UpdateAccountResponse = response
            .json()
            .map_err(|e| FirebaseError::Parse(e.to_string()))?;

        if let Some(tokens) = self.tokens.write().await.as_mut() {
            if let Some(id_token) = body.id_token {
                tokens.id_token = id_token;
            }
            if let Some(refresh_token) = body.refresh_token {
                tokens.refresh_token = Some(refresh_token);
            }
        }

        let identity = Identity {
            id: body.local_id.unwrap_or(current.id),
            email: body.email.or(current.email),
            display_name: body.display_name.or_else(|| Some(display_name.to_string())),
        };

        debug!(user_id = %identity.id, "Display name updated");
        self.session.refresh(identity.clone());

        Ok(identity)
    }
}

#[async_trait]
impl BackendAuthClient for FirebaseAuthClient {
    async fn sign_in_with_credential(
        &self,
        credential: ProviderCredential,
    ) -> BackendResult<Option<Identity>> {
        self.exchange(credential).await.map_err(BackendError::from)
    }

    async fn update_display_name(&self, display_name: &str) -> BackendResult<Identity> {
        self.update_profile(display_name)
            .await
            .map_err(BackendError::from)
    }

    fn session(&self) -> SessionSubscription {
        self.session.subscribe()
    }

    async fn sign_out(&self) -> BackendResult<()> {
        *self.tokens.write().await = None;
        self.session.publish(None);
        info!("Firebase session cleared");
        Ok(())
    }
}

#[async_trait]
impl IdTokenSource for FirebaseAuthClient {
    async fn id_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|tokens| tokens.id_token.clone())
    }
}

impl fmt::Debug for FirebaseAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseAuthClient")
            .field("project_id", &self.config.project_id)
            .field("session", &self.session.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bytes::Bytes;
    use core_auth::BackendErrorCode;
    use mockall::mock;
    use serde_json::Value;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const SIGN_IN_OK: &str = r#"{
        "federatedId": "https://accounts.google.com/1234567890",
        "providerId": "google.com",
        "localId": "uid-1",
        "email": "ada@example.com",
        "displayName": "Ada L.",
        "idToken": "firebase-id-token",
        "refreshToken": "firebase-refresh-token",
        "expiresIn": "3600"
    }"#;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn body_json(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap_or(Value::Null)
    }

    fn config() -> FirebaseConfig {
        FirebaseConfig::builder("test-key", "demo-project")
            .build()
            .unwrap()
    }

    fn google_credential() -> ProviderCredential {
        ProviderCredential::new(
            ProviderKind::Google,
            Some("google-id-token".to_string()),
            Some("google-access-token".to_string()),
        )
        .unwrap()
    }

    fn client_with(http: MockHttpClient) -> FirebaseAuthClient {
        FirebaseAuthClient::new(Arc::new(http), config())
    }

    fn signed_in_http() -> MockHttpClient {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| request.url.contains("accounts:signInWithIdp"))
            .returning(|_| Ok(response(200, SIGN_IN_OK)));
        http
    }

    #[tokio::test]
    async fn test_sign_in_with_idp_request_shape() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                let body = body_json(request);
                let post_body = body["postBody"].as_str().unwrap_or_default();

                request.method == HttpMethod::Post
                    && request.url
                        == "https://identitytoolkit.googleapis.com/v1/accounts:signInWithIdp?key=test-key"
                    && post_body.contains("id_token=google-id-token")
                    && post_body.contains("access_token=google-access-token")
                    && post_body.contains("providerId=google.com")
                    && body["requestUri"] == "http://localhost"
                    && body["returnSecureToken"] == true
                    && body["returnIdpCredential"] == true
            })
            .times(1)
            .returning(|_| Ok(response(200, SIGN_IN_OK)));

        let client = client_with(http);
        let identity = client
            .sign_in_with_credential(google_credential())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(identity.id, "uid-1");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(identity.display_name.as_deref(), Some("Ada L."));
        assert_eq!(client.session().current, Some(identity));
        assert_eq!(client.id_token().await.as_deref(), Some("firebase-id-token"));
    }

    #[tokio::test]
    async fn test_apple_code_is_sent_as_code() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                let body = body_json(request);
                let post_body = body["postBody"].as_str().unwrap_or_default();
                post_body.contains("id_token=apple-jwt")
                    && post_body.contains("code=apple-code")
                    && !post_body.contains("access_token")
                    && post_body.contains("providerId=apple.com")
            })
            .times(1)
            .returning(|_| Ok(response(200, SIGN_IN_OK)));

        let credential = ProviderCredential::new(
            ProviderKind::Apple,
            Some("apple-jwt".to_string()),
            Some("apple-code".to_string()),
        )
        .unwrap();

        let client = client_with(http);
        assert!(client.sign_in_with_credential(credential).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_error_envelope_is_classified() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|_| {
            Ok(response(
                400,
                r#"{"error":{"code":400,"message":"INVALID_IDP_RESPONSE : Invalid Idp Response: id_token audience mismatch","errors":[]}}"#,
            ))
        });

        let client = client_with(http);
        let err = client
            .sign_in_with_credential(google_credential())
            .await
            .unwrap_err();

        assert_eq!(err.code, BackendErrorCode::InvalidCredential);
        assert_eq!(
            err.user_message(),
            Some("The supplied auth credential is malformed or has expired.")
        );
        assert_eq!(client.session().current, None);
    }

    #[tokio::test]
    async fn test_need_confirmation_is_account_exists() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|_| {
            Ok(response(
                200,
                r#"{"localId":"uid-1","email":"ada@example.com","needConfirmation":true}"#,
            ))
        });

        let client = client_with(http);
        let err = client
            .sign_in_with_credential(google_credential())
            .await
            .unwrap_err();

        assert_eq!(err.code, BackendErrorCode::AccountExistsWithDifferentCredential);
    }

    #[tokio::test]
    async fn test_transport_failure_is_network() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("connection refused".to_string())));

        let client = client_with(http);
        let err = client
            .sign_in_with_credential(google_credential())
            .await
            .unwrap_err();

        assert_eq!(err.code, BackendErrorCode::Network);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(response(200, r#"{"providerId":"google.com"}"#)));

        let client = client_with(http);
        let result = client.sign_in_with_credential(google_credential()).await.unwrap();

        assert!(result.is_none());
        assert!(client.id_token().await.is_none());
    }

    #[tokio::test]
    async fn test_same_identity_is_not_republished() {
        let client = client_with(signed_in_http());
        let mut session = client.session();

        client.sign_in_with_credential(google_credential()).await.unwrap();
        client.sign_in_with_credential(google_credential()).await.unwrap();

        let published = session.changes.try_recv().unwrap();
        assert_eq!(published.map(|identity| identity.id).as_deref(), Some("uid-1"));
        assert!(session.changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_display_name() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|request| {
            if request.url.contains("accounts:signInWithIdp") {
                return Ok(response(200, SIGN_IN_OK));
            }

            let body = body_json(&request);
            assert!(request.url.ends_with("/v1/accounts:update?key=test-key"));
            assert_eq!(body["idToken"], "firebase-id-token");
            assert_eq!(body["displayName"], "Ada Lovelace");
            assert_eq!(body["returnSecureToken"], true);

            Ok(response(
                200,
                r#"{"localId":"uid-1","email":"ada@example.com","displayName":"Ada Lovelace","idToken":"refreshed-id-token"}"#,
            ))
        });

        let client = client_with(http);
        client.sign_in_with_credential(google_credential()).await.unwrap();
        let mut session = client.session();

        let identity = client.update_display_name("Ada Lovelace").await.unwrap();

        assert_eq!(identity.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(client.session().current, Some(identity));
        // A profile change is not a session transition.
        assert!(session.changes.try_recv().is_err());
        assert_eq!(client.id_token().await.as_deref(), Some("refreshed-id-token"));
    }

    #[tokio::test]
    async fn test_update_display_name_requires_session() {
        let mut http = MockHttpClient::new();
        http.expect_execute().never();

        let client = client_with(http);
        let err = client.update_display_name("Ada").await.unwrap_err();

        assert_eq!(err.code, BackendErrorCode::Other("NO_CURRENT_USER".to_string()));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let client = client_with(signed_in_http());
        client.sign_in_with_credential(google_credential()).await.unwrap();

        client.sign_out().await.unwrap();

        assert_eq!(client.session().current, None);
        assert!(client.id_token().await.is_none());

        // Signing out again is a no-op.
        client.sign_out().await.unwrap();
    }
}
