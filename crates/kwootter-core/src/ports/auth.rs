//! Authentication ports - session tokens issued by the external auth provider.

/// Claims carried by a session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    /// Auth provider user id.
    pub user_id: String,
    /// Provider session id, empty when the token carries none.
    pub session_id: String,
    pub exp: i64,
}

/// A verified signed-in session, passed explicitly to mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: String,
    /// Raw token, forwarded when the API lives behind a transport.
    pub token: String,
}

/// Token service trait for session JWT operations.
pub trait TokenService: Send + Sync {
    /// Issue a session token for a user.
    fn generate_token(&self, user_id: &str) -> Result<String, AuthError>;

    /// Validate and decode a session token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

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

    #[error("Missing session")]
    MissingAuth,
}
