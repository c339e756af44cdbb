use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::bounds::NegotiationBounds;
use crate::form::NegotiationParameters;

/// Which side of the table the user sits on.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JobSeeker,
    Recruiter,
}

impl Role {
    /// The identifier the backend uses on the wire.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::JobSeeker => "job_seeker",
            Role::Recruiter => "recruiter",
        }
    }

    /// Loose parse for interactive prompts: accepts the wire name, the CLI
    /// name, a menu number, or a human label.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "job_seeker" | "job-seeker" | "job seeker" | "seeker" => Some(Role::JobSeeker),
            "2" | "recruiter" => Some(Role::Recruiter),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::JobSeeker => write!(f, "Job Seeker"),
            Role::Recruiter => write!(f, "Recruiter"),
        }
    }
}

/// Opaque session identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a backend-issued id. Blank ids are not sessions.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(SessionId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// -- POST /api/start-negotiation -------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNegotiationRequest {
    pub role: Role,
    pub job_title: String,
    #[serde(flatten)]
    pub bounds: NegotiationBounds,
    pub years_experience: f64,
}

impl StartNegotiationRequest {
    /// Translate validated form parameters into the backend's schema.
    pub fn from_parameters(params: &NegotiationParameters) -> Self {
        Self {
            role: params.role,
            job_title: params.job_title.clone(),
            bounds: params.bounds(),
            years_experience: params.years_experience,
        }
    }
}

/// Success body. Anything without a `session_id` string fails to parse.
#[derive(Debug, Deserialize)]
pub struct StartNegotiationResponse {
    pub session_id: String,
}

// -- GET /api/session/{id} -------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeekerRange {
    pub min: f64,
    pub target: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruiterRange {
    pub min: f64,
    pub max: f64,
}

/// Facts the engine has extracted from each side's messages so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFacts {
    #[serde(default)]
    pub job_seeker: Vec<String>,
    #[serde(default)]
    pub recruiter: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
}

/// Server-side record of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub role: Role,
    pub job_title: String,
    pub seeker_range: SeekerRange,
    pub recruiter_range: RecruiterRange,
    #[serde(default)]
    pub facts: SessionFacts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<StoredMessage>,
}
