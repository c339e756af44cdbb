//! Top-level flow: pick a role, fill in the form, chat.
//!
//! `RoleUnset` → `RoleSet` → `SessionActive`. Both transitions are one-way:
//! the role cannot be changed once picked and an active session cannot be
//! abandoned for a new one without constructing a new controller. A failed
//! session creation leaves the controller in `RoleSet` so the form can be
//! resubmitted.

use tracing::{info, warn};

use crate::channel::SessionChannel;
use crate::config::ClientConfig;
use crate::error::{NegotiationError, Result};
use crate::form::{NegotiationForm, NegotiationParameters};
use crate::initiator::{SessionInitiator, SessionStarter};
use crate::protocol::{Role, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    RoleUnset,
    RoleSet { role: Role },
    SessionActive { role: Role, session_id: SessionId },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::RoleUnset => "no role is selected",
            FlowState::RoleSet { .. } => "no session is active",
            FlowState::SessionActive { .. } => "a session is active",
        }
    }
}

/// Owns the session: its id, and the channel and transcript scoped to it.
pub struct FlowController<S = SessionInitiator> {
    config: ClientConfig,
    starter: S,
    state: FlowState,
    channel: Option<SessionChannel>,
}

impl FlowController<SessionInitiator> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let starter = SessionInitiator::new(config.clone())?;
        Ok(Self::with_starter(config, starter))
    }
}

impl<S: SessionStarter> FlowController<S> {
    pub fn with_starter(config: ClientConfig, starter: S) -> Self {
        Self {
            config,
            starter,
            state: FlowState::RoleUnset,
            channel: None,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn starter(&self) -> &S {
        &self.starter
    }

    pub fn role(&self) -> Option<Role> {
        match &self.state {
            FlowState::RoleUnset => None,
            FlowState::RoleSet { role } | FlowState::SessionActive { role, .. } => Some(*role),
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match &self.state {
            FlowState::SessionActive { session_id, .. } => Some(session_id),
            _ => None,
        }
    }

    /// Pick the role. Only allowed once.
    pub fn select_role(&mut self, role: Role) -> Result<()> {
        if self.state != FlowState::RoleUnset {
            return Err(NegotiationError::InvalidTransition {
                action: "select a role",
                state: self.state.name(),
            });
        }
        info!(role = role.as_wire(), "role selected");
        self.state = FlowState::RoleSet { role };
        Ok(())
    }

    /// Validate the form against the selected role and try to start a
    /// session.
    ///
    /// # Returns
    /// - `Ok(Some(id))` after moving to `SessionActive`.
    /// - `Ok(None)` when the backend gave no session; still `RoleSet`.
    /// - `Err(InvalidInput)` when the form is rejected; nothing is sent.
    /// - `Err(InvalidTransition)` outside `RoleSet`.
    pub async fn submit(&mut self, form: &NegotiationForm) -> Result<Option<SessionId>> {
        let role = self.require_role_set("submit the form")?;
        let params = form.validate(role).inspect_err(|e| {
            warn!(error = %e, "negotiation form rejected");
        })?;
        self.start_session(&params).await
    }

    /// Like [`submit`](Self::submit) for parameters validated elsewhere.
    /// The parameters' role must match the selected one.
    pub async fn submit_parameters(
        &mut self,
        params: &NegotiationParameters,
    ) -> Result<Option<SessionId>> {
        let role = self.require_role_set("submit parameters")?;
        if params.role != role {
            return Err(NegotiationError::InvalidInput {
                field: "role",
                reason: format!("parameters are for {} but {} was selected", params.role, role),
            });
        }
        self.start_session(params).await
    }

    async fn start_session(&mut self, params: &NegotiationParameters) -> Result<Option<SessionId>> {
        match self.starter.start(params).await {
            Some(session_id) => {
                info!(session_id = %session_id, "session active");
                self.state = FlowState::SessionActive {
                    role: params.role,
                    session_id: session_id.clone(),
                };
                Ok(Some(session_id))
            }
            None => {
                warn!("no session created, staying on parameter entry");
                Ok(None)
            }
        }
    }

    fn require_role_set(&self, action: &'static str) -> Result<Role> {
        match &self.state {
            FlowState::RoleSet { role } => Ok(*role),
            other => Err(NegotiationError::InvalidTransition {
                action,
                state: other.name(),
            }),
        }
    }

    /// Open (or return the already open) channel for the active session.
    pub async fn open_channel(&mut self) -> Result<&mut SessionChannel> {
        let session_id = match &self.state {
            FlowState::SessionActive { session_id, .. } => session_id.clone(),
            other => {
                return Err(NegotiationError::InvalidTransition {
                    action: "open the channel",
                    state: other.name(),
                })
            }
        };
        let channel = self
            .channel
            .get_or_insert_with(|| SessionChannel::new(self.config.clone()));
        channel.connect(session_id).await?;
        Ok(channel)
    }

    pub fn channel(&self) -> Option<&SessionChannel> {
        self.channel.as_ref()
    }

    pub fn channel_mut(&mut self) -> Option<&mut SessionChannel> {
        self.channel.as_mut()
    }

    /// Tear down the session view: close the channel if it is open.
    /// Returns `true` if a connection was closed by this call.
    pub async fn shutdown(&mut self) -> bool {
        match self.channel.as_mut() {
            Some(channel) => channel.close().await,
            None => false,
        }
    }
}
