//! End-to-end sign-in through the gateway and the Firebase backend

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AppleAuthorizationStatus, AppleIdCredential, AppleScope, AppleSignInSdk, GoogleAccount,
    GoogleAuthentication, GoogleSignInSdk, HttpClient, HttpMethod, HttpRequest, HttpResponse,
    PersonNameComponents,
};
use bytes::Bytes;
use core_auth::{AuthFailureKind, AuthGateway, AuthResult};
use core_runtime::config::AuthConfig;
use mockall::mock;
use provider_firebase::{firebase_backend, FirebaseConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_stream::StreamExt;

mock! {
    GoogleSdk {}

    #[async_trait]
    impl GoogleSignInSdk for GoogleSdk {
        async fn sign_in(&self) -> BridgeResult<Option<GoogleAccount>>;
        async fn authentication(&self, account: &GoogleAccount) -> BridgeResult<GoogleAuthentication>;
        async fn is_signed_in(&self) -> BridgeResult<bool>;
        async fn sign_out(&self) -> BridgeResult<()>;
    }
}

mock! {
    AppleSdk {}

    #[async_trait]
    impl AppleSignInSdk for AppleSdk {
        async fn is_available(&self) -> bool;
        async fn request_authorization(&self, scopes: &[AppleScope]) -> BridgeResult<AppleAuthorizationStatus>;
    }
}

/// Answers Identity Toolkit and Firestore calls and records every request.
#[derive(Default)]
struct FirebaseStub {
    requests: Mutex<Vec<HttpRequest>>,
    reject_sign_in: bool,
}

impl FirebaseStub {
    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn body_of(request: &HttpRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap_or(Value::Null)
}

#[async_trait]
impl HttpClient for FirebaseStub {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let response = if request.url.contains("accounts:signInWithIdp") {
            if self.reject_sign_in {
                json_response(
                    400,
                    r#"{"error":{"code":400,"message":"USER_DISABLED : The user account has been disabled by an administrator."}}"#,
                )
            } else {
                json_response(
                    200,
                    r#"{"localId":"uid-1","email":"ada@example.com","idToken":"fb-id-token","refreshToken":"fb-refresh"}"#,
                )
            }
        } else if request.url.contains("accounts:update") {
            let name = body_of(&request)["displayName"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            json_response(
                200,
                &serde_json::json!({
                    "localId": "uid-1",
                    "email": "ada@example.com",
                    "displayName": name,
                })
                .to_string(),
            )
        } else {
            json_response(200, "{}")
        };

        Ok(response)
    }
}

fn firebase_config() -> FirebaseConfig {
    FirebaseConfig::builder("test-key", "demo-project")
        .build()
        .unwrap()
}

fn google_sdk() -> MockGoogleSdk {
    let mut sdk = MockGoogleSdk::new();
    sdk.expect_sign_in().returning(|| {
        Ok(Some(GoogleAccount {
            id: "g-1".to_string(),
            email: "ada@example.com".to_string(),
            display_name: None,
        }))
    });
    sdk.expect_authentication().returning(|_| {
        Ok(GoogleAuthentication {
            id_token: Some("google-id-token".to_string()),
            access_token: None,
        })
    });
    sdk.expect_is_signed_in().returning(|| Ok(true));
    sdk.expect_sign_out().returning(|| Ok(()));
    sdk
}

#[tokio::test]
async fn test_google_sign_in_writes_profile_with_session_token() {
    let http = Arc::new(FirebaseStub::default());
    let (backend, profiles) = firebase_backend(http.clone(), firebase_config());
    let gateway = AuthGateway::new(backend, profiles, AuthConfig::default())
        .with_google_sdk(Arc::new(google_sdk()));

    assert_eq!(gateway.sign_in_with_google().await, AuthResult::Success);
    assert_eq!(
        gateway.current_identity().map(|identity| identity.id),
        Some("uid-1".to_string())
    );

    let requests = http.requests();
    assert_eq!(requests.len(), 2);

    let patch = &requests[1];
    assert_eq!(patch.method, HttpMethod::Patch);
    assert!(patch.url.contains("/documents/users/uid-1?updateMask.fieldPaths=email"));
    assert_eq!(
        patch.headers.get("Authorization").map(String::as_str),
        Some("Bearer fb-id-token")
    );
    assert_eq!(
        body_of(patch)["fields"]["email"]["stringValue"],
        "ada@example.com"
    );

    gateway.sign_out().await.unwrap();
    assert!(gateway.current_identity().is_none());
}

fn apple_with_full_name() -> MockAppleSdk {
    let mut apple = MockAppleSdk::new();
    apple.expect_is_available().returning(|| true);
    apple.expect_request_authorization().returning(|_| {
        Ok(AppleAuthorizationStatus::Authorized(AppleIdCredential {
            user: "001234.abcd".to_string(),
            identity_token: Some("apple-jwt".to_string()),
            authorization_code: Some("apple-code".to_string()),
            email: None,
            full_name: Some(PersonNameComponents {
                given_name: Some("Ada".to_string()),
                family_name: Some("Lovelace".to_string()),
            }),
        }))
    });
    apple
}

#[tokio::test]
async fn test_apple_full_name_reaches_profile_document() {
    let http = Arc::new(FirebaseStub::default());
    let (backend, profiles) = firebase_backend(http.clone(), firebase_config());
    let gateway = AuthGateway::new(backend, profiles, AuthConfig::default())
        .with_apple_sdk(Arc::new(apple_with_full_name()));

    assert_eq!(gateway.sign_in_with_apple().await, AuthResult::Success);

    let urls: Vec<String> = http.requests().iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls.len(), 3);
    assert!(urls[0].contains("accounts:signInWithIdp"));
    assert!(urls[1].contains("accounts:update"));
    assert!(urls[2].contains("/documents/users/uid-1"));

    let patch = &http.requests()[2];
    assert_eq!(
        body_of(patch)["fields"]["name"]["stringValue"],
        "Ada Lovelace"
    );
}

#[tokio::test]
async fn test_backend_rejection_surfaces_firebase_message() {
    let http = Arc::new(FirebaseStub {
        reject_sign_in: true,
        ..FirebaseStub::default()
    });
    let (backend, profiles) = firebase_backend(http.clone(), firebase_config());
    let gateway = AuthGateway::new(backend, profiles, AuthConfig::default())
        .with_google_sdk(Arc::new(google_sdk()));

    let result = gateway.sign_in_with_google().await;

    assert_eq!(result.kind(), Some(AuthFailureKind::BackendAuth));
    assert_eq!(
        result.message(),
        Some("The user account has been disabled by an administrator.")
    );
    assert_eq!(http.requests().len(), 1);
    assert!(gateway.current_identity().is_none());
}

#[tokio::test]
async fn test_apple_sign_in_is_one_session_change() {
    let http = Arc::new(FirebaseStub::default());
    let (backend, profiles) = firebase_backend(http, firebase_config());
    let gateway = AuthGateway::new(backend, profiles, AuthConfig::default())
        .with_apple_sdk(Arc::new(apple_with_full_name()));

    let mut users = gateway.current_user();
    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Ok(Some(user)) =
            tokio::time::timeout(Duration::from_millis(100), users.next()).await
        {
            seen.push(user.map(|identity| identity.id));
        }
        seen
    });

    assert_eq!(gateway.sign_in_with_apple().await, AuthResult::Success);

    let seen = collector.await.unwrap();
    assert_eq!(seen, vec![None, Some("uid-1".to_string())]);
    assert_eq!(
        gateway
            .current_identity()
            .and_then(|identity| identity.display_name)
            .as_deref(),
        Some("Ada Lovelace")
    );
}

#[tokio::test]
async fn test_sign_in_then_sign_out_reaches_idle_subscriber() {
    let http = Arc::new(FirebaseStub::default());
    let (backend, profiles) = firebase_backend(http, firebase_config());
    let gateway = AuthGateway::new(backend, profiles, AuthConfig::default())
        .with_google_sdk(Arc::new(google_sdk()));

    let mut users = gateway.current_user();
    assert_eq!(users.next().await, Some(None));

    assert_eq!(gateway.sign_in_with_google().await, AuthResult::Success);
    gateway.sign_out().await.unwrap();

    let signed_in = users.next().await.flatten();
    assert_eq!(signed_in.map(|identity| identity.id).as_deref(), Some("uid-1"));
    assert_eq!(users.next().await, Some(None));
}
