//! Error types for authentication

/// Errors raised while authenticating or checking a session
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hash error: {0}")]
    Hash(String),

    #[error("Duplicate account: {0}")]
    DuplicateAccount(String),

    #[error("Session check failed: {0}")]
    Check(String),
}

/// Result type alias for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;
