//! Wire types for the Identity Toolkit and Firestore REST APIs

use bridge_traits::http::HttpResponse;
use serde::{Deserialize, Serialize};

/// Request body for `accounts:signInWithIdp`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpRequest<'a> {
    /// Form-encoded provider tokens (`id_token`, `access_token`, `providerId`)
    pub post_body: String,
    pub request_uri: &'a str,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

/// Response body for `accounts:signInWithIdp`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignInWithIdpResponse {
    pub local_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub provider_id: Option<String>,
    /// Set when the email already belongs to an account with another provider
    pub need_confirmation: Option<bool>,
    /// Some failures come back with a 200 status and this field set
    pub error_message: Option<String>,
}

/// Request body for `accounts:update`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest<'a> {
    pub id_token: &'a str,
    pub display_name: &'a str,
    pub return_secure_token: bool,
}

/// Response body for `accounts:update`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateAccountResponse {
    pub local_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Google API error envelope shared by both services
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    /// Canonical status such as `PERMISSION_DENIED` (Firestore only)
    pub status: Option<String>,
}

impl ErrorBody {
    /// Error details of a failed response; empty when the body is not an envelope.
    pub fn from_response(response: &HttpResponse) -> Self {
        response
            .json::<ErrorEnvelope>()
            .map(|envelope| envelope.error)
            .unwrap_or_default()
    }
}

/// Firestore document write
#[derive(Debug, Serialize)]
pub struct ProfileDocument {
    pub fields: ProfileFields,
}

#[derive(Debug, Serialize)]
pub struct ProfileFields {
    pub email: FirestoreValue,
    pub name: FirestoreValue,
}

/// Typed Firestore field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    StringValue(String),
    NullValue(()),
}

impl From<Option<&str>> for FirestoreValue {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(s) => FirestoreValue::StringValue(s.to_string()),
            None => FirestoreValue::NullValue(()),
        }
    }
}
