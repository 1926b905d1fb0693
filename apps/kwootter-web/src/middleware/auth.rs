//! Session extractors.
//!
//! The session token is read from the `__session` cookie set by the auth provider, or from an
//! `Authorization: Bearer` header for API callers.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use kwootter_core::ports::{AuthError, AuthSession, TokenService};
use kwootter_shared::ErrorResponse;

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "__session";

/// Signed-in user identity extractor.
///
/// ```ignore
/// async fn create(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    token: String,
}

impl Identity {
    /// The session handed to mutations.
    pub fn session(&self) -> AuthSession {
        AuthSession {
            user_id: self.user_id.clone(),
            token: self.token.clone(),
        }
    }

    fn resolve(req: &HttpRequest) -> Result<Self, AuthError> {
        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            tracing::error!("AppState not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

        let token = session_token(req).ok_or(AuthError::MissingAuth)?;
        Self::verify(state.tokens.as_ref(), token)
    }

    fn verify(tokens: &dyn TokenService, token: String) -> Result<Self, AuthError> {
        let claims = tokens.validate_token(&token)?;
        Ok(Self {
            user_id: claims.user_id,
            token,
        })
    }
}

/// Bearer header first, then the session cookie.
fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    bearer
        .or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Session Expired")
                .with_detail("Your session has expired. Please sign in again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Session").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::unauthorized()
                .with_detail("Sign in to continue."),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::resolve(req).map_err(AuthenticationError))
    }
}

/// Optional identity extractor - doesn't fail if not signed in.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match Identity::resolve(req) {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(AuthError::MissingAuth) => ready(Ok(OptionalIdentity(None))),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable session");
                ready(Ok(OptionalIdentity(None)))
            }
        }
    }
}
