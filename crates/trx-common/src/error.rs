use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Common error types for TRX transfers
#[derive(Error, Debug)]
pub enum TrxError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response format: {0}")]
    ResponseFormat(String),

    #[error("Insufficient funds: need {needed} sun, have {available} sun")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("Transaction build failed: {0}")]
    TransactionBuild(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Node rejected transaction ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(Box<serde_json::Error>),

    #[error("IO error: {0}")]
    Io(Box<std::io::Error>),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Coarse classification a caller can branch on without matching every variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    NetworkError,
    ResponseFormatError,
    InsufficientFunds,
    TransactionBuildError,
    SigningError,
    /// The node answered and refused the transaction
    Rejected,
    /// Outcome cannot be determined locally, e.g. a broadcast lost in transit
    Unknown,
}

impl TrxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrxError::InvalidInput(_) | TrxError::InvalidConfig(_) => ErrorKind::InvalidInput,
            TrxError::Network(_) | TrxError::Timeout(_) | TrxError::Io(_) => {
                ErrorKind::NetworkError
            }
            TrxError::ResponseFormat(_) | TrxError::Serialization(_) => {
                ErrorKind::ResponseFormatError
            }
            TrxError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            TrxError::TransactionBuild(_) => ErrorKind::TransactionBuildError,
            TrxError::Signing(_) => ErrorKind::SigningError,
            TrxError::Rejected { .. } => ErrorKind::Rejected,
            TrxError::Generic(_) => ErrorKind::Unknown,
        }
    }

    /// Transport-level failures, after which a submitted transaction may or may not have landed
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::NetworkError)
    }
}

/// Result type alias for TRX operations
pub type Result<T> = std::result::Result<T, TrxError>;

impl From<serde_json::Error> for TrxError {
    fn from(err: serde_json::Error) -> Self {
        TrxError::Serialization(Box::new(err))
    }
}

impl From<std::io::Error> for TrxError {
    fn from(err: std::io::Error) -> Self {
        TrxError::Io(Box::new(err))
    }
}

impl From<eyre::Error> for TrxError {
    fn from(err: eyre::Error) -> Self {
        TrxError::Generic(err.to_string())
    }
}
