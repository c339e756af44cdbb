//! # salary-negotiator
//!
//! Client for an AI-mediated salary negotiation service. The user picks a
//! role, fills in the job and salary details, and chats with the remote
//! negotiation engine over a WebSocket.
//!
//! ## Flow
//! 1. [`flow::FlowController::select_role`]
//! 2. [`flow::FlowController::submit`] validates the form, derives the
//!    [`bounds::NegotiationBounds`] and asks the backend for a session id
//!    (`POST /api/start-negotiation`).
//! 3. [`flow::FlowController::open_channel`] connects
//!    `/ws/negotiation/{session_id}`; messages in both directions land in
//!    the session's [`transcript::Transcript`].
//!
//! ```rust,ignore
//! let mut flow = FlowController::new(ClientConfig::new("http://localhost:8000")?)?;
//! flow.select_role(Role::JobSeeker)?;
//! if flow.submit(&form).await?.is_some() {
//!     let channel = flow.open_channel().await?;
//!     channel.send("I was hoping for 120k").await;
//!     while let Some(entry) = channel.recv().await {
//!         println!("{entry}");
//!     }
//! }
//! ```

pub mod bounds;
pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod form;
pub mod initiator;
pub mod logging;
pub mod protocol;
pub mod transcript;

pub use bounds::{derive_bounds, NegotiationBounds};
pub use channel::{ChannelState, SessionChannel};
pub use config::ClientConfig;
pub use error::{NegotiationError, Result};
pub use flow::{FlowController, FlowState};
pub use form::{NegotiationForm, NegotiationParameters};
pub use initiator::{SessionInitiator, SessionStarter};
pub use protocol::{Role, SessionId, SessionSnapshot};
pub use transcript::{Origin, Speaker, Transcript, TranscriptEntry};
