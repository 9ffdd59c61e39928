use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Canonical failure kinds surfaced to the layer above the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CredentialError,
    PermissionError,
    IpWhitelistError,
    TemporaryLock,
    BalanceLocked,
    InsufficientBalance,
    MinimumNotMet,
    SymbolUnavailable,
    UnknownVenueError,
    Infrastructure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::CredentialError => "CredentialError",
            ErrorKind::PermissionError => "PermissionError",
            ErrorKind::IpWhitelistError => "IPWhitelistError",
            ErrorKind::TemporaryLock => "TemporaryLock",
            ErrorKind::BalanceLocked => "BalanceLocked",
            ErrorKind::InsufficientBalance => "InsufficientBalance",
            ErrorKind::MinimumNotMet => "MinimumNotMet",
            ErrorKind::SymbolUnavailable => "SymbolUnavailable",
            ErrorKind::UnknownVenueError => "UnknownVenueError",
            ErrorKind::Infrastructure => "Infrastructure",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Permission error: {0}")]
    Permission(String),

    #[error("IP whitelist error: {0}")]
    IpWhitelist(String),

    #[error("Temporary lock: {0}")]
    TemporaryLock(String),

    #[error("Balance locked: {0}")]
    BalanceLocked(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Minimum not met: {0}")]
    MinimumNotMet(String),

    #[error("Symbol unavailable: {0}")]
    SymbolUnavailable(String),

    #[error("Venue error [{code}]: {message}")]
    UnknownVenue { code: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Currency not mapped: {0}")]
    CurrencyNotMapped(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Builds the taxonomy variant for `kind`, keeping the vendor message.
    pub fn from_kind(kind: ErrorKind, code: &str, message: &str) -> Self {
        let message = message.to_string();
        match kind {
            ErrorKind::CredentialError => BridgeError::Credential(message),
            ErrorKind::PermissionError => BridgeError::Permission(message),
            ErrorKind::IpWhitelistError => BridgeError::IpWhitelist(message),
            ErrorKind::TemporaryLock => BridgeError::TemporaryLock(message),
            ErrorKind::BalanceLocked => BridgeError::BalanceLocked(message),
            ErrorKind::InsufficientBalance => BridgeError::InsufficientBalance(message),
            ErrorKind::MinimumNotMet => BridgeError::MinimumNotMet(message),
            ErrorKind::SymbolUnavailable => BridgeError::SymbolUnavailable(message),
            ErrorKind::UnknownVenueError | ErrorKind::Infrastructure => BridgeError::UnknownVenue {
                code: code.to_string(),
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Credential(_) => ErrorKind::CredentialError,
            BridgeError::Permission(_) => ErrorKind::PermissionError,
            BridgeError::IpWhitelist(_) => ErrorKind::IpWhitelistError,
            BridgeError::TemporaryLock(_) => ErrorKind::TemporaryLock,
            BridgeError::BalanceLocked(_) => ErrorKind::BalanceLocked,
            BridgeError::InsufficientBalance(_) => ErrorKind::InsufficientBalance,
            BridgeError::MinimumNotMet(_) => ErrorKind::MinimumNotMet,
            BridgeError::SymbolUnavailable(_) => ErrorKind::SymbolUnavailable,
            BridgeError::UnknownVenue { .. } => ErrorKind::UnknownVenueError,
            _ => ErrorKind::Infrastructure,
        }
    }

    /// Only this condition is retried, and only by the withdrawal orchestrator.
    pub fn is_balance_locked(&self) -> bool {
        matches!(self, BridgeError::BalanceLocked(_))
    }
}
