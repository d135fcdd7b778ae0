//! Error types for the client crate

use thiserror::Error;

use mapvote_common::ConstituencyNo;

/// Failure of a single request to the election API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response, with the message extracted from its body if any
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Status { status: u16, message: Option<String> },

    /// 2xx response whose body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

pub const CONFLICT: u16 = 409;

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server refused because this device already voted.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(CONFLICT)
    }

    /// Server-provided text, when the failure carried any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// A vote-session action was attempted out of order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No constituency is loaded")]
    NoSeatLoaded,

    #[error("No candidate selected")]
    NoCandidate,

    #[error("Candidate {candidate_id} does not stand in constituency {constituency_no}")]
    UnknownCandidate {
        candidate_id: String,
        constituency_no: ConstituencyNo,
    },

    #[error("A vote submission is already in flight")]
    SubmissionInFlight,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptchaError {
    #[error("Failed to load captcha script {url}: {reason}")]
    ScriptLoad { url: String, reason: String },

    #[error("Failed to render captcha widget: {0}")]
    Render(String),
}
