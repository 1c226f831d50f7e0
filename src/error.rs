//! Error types for prizebot

use thiserror::Error;

/// Claim store failures. A missing claim is not an error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Profile/proof provider failures.
///
/// Individual malformed fields never produce one of these; they degrade to
/// zero in the parser. These cover the request as a whole.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Undecodable response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for VerifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VerifyError::Timeout(e.to_string())
        } else if e.is_decode() {
            VerifyError::Decode(e.to_string())
        } else {
            VerifyError::Network(e.to_string())
        }
    }
}

/// Chat gateway failures.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("NATS error: {0}")]
    Nats(String),

    #[error("Gateway rejected request: {0}")]
    Rejected(String),

    #[error("Gateway timeout: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Which user-visible rejection a handler produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Paused,
    Duplicate,
    MissingRequirement,
}

/// How the dispatch boundary treats a [`HandlerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Reply with the carried message (and reaction, if any).
    UserVisible,
    /// Reply with a generic "try again" message, log the detail.
    Transient,
    /// No reply, debug log only.
    Silent,
    /// Payment confirmed but the claim was not recorded.
    Fatal,
}

/// Everything a trigger handler can fail with.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("{message}")]
    UserVisible {
        kind: RejectionKind,
        message: String,
        reaction: Option<String>,
    },

    #[error("ignored: {0}")]
    Silent(String),

    #[error("Verification failed: {0}")]
    Verification(#[from] VerifyError),

    #[error("Claim store failed: {0}")]
    Storage(#[from] StoreError),

    #[error("Gateway failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Claim {key} not recorded after confirmed payment: {source}")]
    ClaimNotRecorded {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl HandlerError {
    pub fn user_visible(kind: RejectionKind, message: impl Into<String>) -> Self {
        HandlerError::UserVisible {
            kind,
            message: message.into(),
            reaction: None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            HandlerError::UserVisible { .. } => ErrorClass::UserVisible,
            HandlerError::Silent(_) => ErrorClass::Silent,
            HandlerError::Verification(_)
            | HandlerError::Storage(_)
            | HandlerError::Gateway(_) => ErrorClass::Transient,
            HandlerError::ClaimNotRecorded { .. } => ErrorClass::Fatal,
        }
    }
}
