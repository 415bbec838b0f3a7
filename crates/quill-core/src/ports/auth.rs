//! Session token port used when the server verifies the acting principal.

/// Claims carried by a verified session token.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    /// Identity provider uid of the signed-in user.
    pub subject: String,
    pub email: String,
    pub exp: i64,
}

/// Token service trait for session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a session token for `subject`.
    fn issue(&self, subject: &str, email: &str) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// Lifetime of issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
