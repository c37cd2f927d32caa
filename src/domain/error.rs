use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("webhook signature: {0}")]
    Auth(String),

    #[error("gateway: {0}")]
    Gateway(String),

    #[error("collaborator: {0}")]
    Collaborator(String),

    #[error("config: {0}")]
    Config(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by the CRM collaborator. Kept apart from `CheckoutError`
/// because the retrier has to tell transient failures from permanent ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrmError {
    #[error("Not configured")]
    NotConfigured,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timeout")]
    Timeout,

    #[error("connection refused: {0}")]
    Connect(String),

    #[error("transport: {0}")]
    Transport(String),
}

const TRANSIENT_HINTS: &[&str] = &[
    "timeout",
    "timed out",
    "etimedout",
    "econnrefused",
    "connection refused",
    "network",
    "unreachable",
];

impl CrmError {
    /// Server errors and network-level failures are worth another attempt;
    /// missing configuration and client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotConfigured => false,
            Self::Status { status, .. } => *status >= 500,
            Self::Timeout | Self::Connect(_) => true,
            Self::Transport(msg) => {
                let msg = msg.to_lowercase();
                TRANSIENT_HINTS.iter().any(|hint| msg.contains(hint))
            }
        }
    }
}
