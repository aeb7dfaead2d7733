//! Profile documents in Cloud Firestore.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use core_auth::{BackendError, BackendErrorCode, BackendResult, ProfileRecord, ProfileStore};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::auth::IdTokenSource;
use crate::config::FirebaseConfig;
use crate::error::{FirebaseError, Result};
use crate::types::{ErrorBody, FirestoreValue, ProfileDocument, ProfileFields};

/// Only these fields are written; anything else on the document is kept.
const UPDATE_MASK: &str = "updateMask.fieldPaths=email&updateMask.fieldPaths=name";

/// `ProfileStore` writing one document per user into a Firestore collection.
pub struct FirestoreProfileStore {
    http_client: Arc<dyn HttpClient>,
    config: FirebaseConfig,
    tokens: Arc<dyn IdTokenSource>,
}

impl FirestoreProfileStore {
    /// `tokens` supplies the bearer token, normally the `FirebaseAuthClient`.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        config: FirebaseConfig,
        tokens: Arc<dyn IdTokenSource>,
    ) -> Self {
        Self {
            http_client,
            config,
            tokens,
        }
    }

    #[instrument(skip(self, record, id_token), fields(user_id = %record.id))]
    async fn patch(&self, record: &ProfileRecord, id_token: &str) -> Result<()> {
        let url = format!(
            "{}?{}",
            self.config.profile_document_url(&record.id),
            UPDATE_MASK
        );

        let document = ProfileDocument {
            fields: ProfileFields {
                email: FirestoreValue::from(record.email.as_deref()),
                name: FirestoreValue::from(record.display_name.as_deref()),
            },
        };

        let request = HttpRequest::new(HttpMethod::Patch, url)
            .bearer_token(id_token)
            .json(&document)?
            .timeout(self.config.request_timeout);

        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::default())
            .await?;

        if response.is_success() {
            debug!("Profile document written");
            return Ok(());
        }

        let error = ErrorBody::from_response(&response);
        let code = error
            .status
            .unwrap_or_else(|| format!("HTTP_{}", response.status));
        warn!(status = response.status, error_code = %code, "Firestore write failed");

        Err(FirebaseError::Firestore {
            status: response.status,
            code,
            message: error.message,
        })
    }
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn upsert(&self, record: &ProfileRecord) -> BackendResult<()> {
        let id_token = self.tokens.id_token().await.ok_or_else(|| {
            warn!("Profile write attempted without a signed-in user");
            BackendError::new(
                BackendErrorCode::PermissionDenied,
                "Missing or insufficient permissions.",
            )
        })?;

        self.patch(record, &id_token)
            .await
            .map_err(BackendError::from)
    }
}
