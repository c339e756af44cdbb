//! HTTP side of the session lifecycle: creating a negotiation session and
//! reading back the server's record of it.

use std::future::Future;

use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::{NegotiationError, Result};
use crate::form::NegotiationParameters;
use crate::protocol::{SessionId, SessionSnapshot, StartNegotiationRequest, StartNegotiationResponse};

/// Anything that can turn validated parameters into a session id.
///
/// Failure is an absent id, never an error: the caller only needs to know
/// whether to advance, and the details have already been logged.
pub trait SessionStarter {
    fn start(&self, params: &NegotiationParameters) -> impl Future<Output = Option<SessionId>> + Send;
}

/// Client for `POST /api/start-negotiation` and `GET /api/session/{id}`.
///
/// Every call to [`start`](SessionStarter::start) issues exactly one request
/// and may create a new remote session; nothing is retried or deduplicated.
pub struct SessionInitiator {
    config: ClientConfig,
    client: reqwest::Client,
}

impl SessionInitiator {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| NegotiationError::Transport {
                url: config.base_url.clone(),
                source,
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a session, reporting why it failed.
    ///
    /// # Returns
    /// - `Ok(SessionId)` on a 2xx response carrying a non-empty `session_id`.
    /// - `Err(NegotiationError::Transport)` when no response arrived.
    /// - `Err(NegotiationError::Status)` on a non-2xx status.
    /// - `Err(NegotiationError::MalformedResponse)` when the body lacks an id.
    pub async fn try_start(&self, params: &NegotiationParameters) -> Result<SessionId> {
        let url = self.config.start_negotiation_url();
        let body = StartNegotiationRequest::from_parameters(params);
        debug!(url = %url, role = params.role.as_wire(), "requesting new negotiation session");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| NegotiationError::Transport {
                url: url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(NegotiationError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }

        let bytes = resp.bytes().await.map_err(|source| NegotiationError::Transport {
            url: url.clone(),
            source,
        })?;
        let parsed: StartNegotiationResponse =
            serde_json::from_slice(&bytes).map_err(|e| NegotiationError::MalformedResponse {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        SessionId::new(parsed.session_id).ok_or(NegotiationError::MalformedResponse {
            url,
            detail: "session_id is empty".into(),
        })
    }

    /// Fetch the backend's stored record for a session.
    pub async fn fetch_session(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        let url = self.config.session_url(session_id);
        debug!(url = %url, "fetching session snapshot");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| NegotiationError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(NegotiationError::SessionNotFound(session_id.to_string()));
        }
        if !status.is_success() {
            return Err(NegotiationError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = resp.bytes().await.map_err(|source| NegotiationError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| NegotiationError::MalformedResponse {
            url,
            detail: e.to_string(),
        })
    }
}

impl SessionStarter for SessionInitiator {
    async fn start(&self, params: &NegotiationParameters) -> Option<SessionId> {
        match self.try_start(params).await {
            Ok(session_id) => {
                info!(session_id = %session_id, "negotiation session created");
                Some(session_id)
            }
            Err(e) => {
                error!(error = %e, "failed to get session id from negotiation API");
                None
            }
        }
    }
}
