//! Session Query Service
//!
//! Read-only lookup of a checkout session for the confirmation page. Nothing
//! here grants a purchase; that is the webhook's job.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PaymentsConfig;
use crate::error::{PaymentError, Result};
use crate::identity::CallerIdentity;
use crate::provider::{PaymentProvider, SessionDetails};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

impl GetSessionRequest {
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: SessionDetails,
}

pub struct SessionQueryService {
    provider: Arc<dyn PaymentProvider>,
    config: Arc<PaymentsConfig>,
}

impl SessionQueryService {
    pub fn new(provider: Arc<dyn PaymentProvider>, config: Arc<PaymentsConfig>) -> Self {
        Self { provider, config }
    }

    pub async fn get_session(
        &self,
        caller: Option<&CallerIdentity>,
        request: GetSessionRequest,
    ) -> Result<SessionResponse> {
        let caller = caller.ok_or_else(|| {
            PaymentError::Unauthenticated("You must be authenticated to access.".into())
        })?;

        let session_id = request
            .session_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PaymentError::InvalidArgument("Missing session ID.".into()))?;

        let session = self
            .provider
            .retrieve_session(&session_id)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "Error retrieving session ID");
                e.or_internal("Error retrieving session ID.")
            })?;

        if self.config.require_session_owner && session.user_id() != Some(caller.uid.as_str()) {
            tracing::warn!(
                uid = %caller.uid,
                session_id = %session_id,
                "Caller does not own the requested session"
            );
            return Err(PaymentError::PermissionDenied(
                "You do not have access to this session.".into(),
            ));
        }

        Ok(SessionResponse {
            success: true,
            session,
        })
    }
}
