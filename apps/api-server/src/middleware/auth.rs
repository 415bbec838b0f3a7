//! Principal resolution for mutating calls.
//!
//! In client mode the acting principal is whatever identifier the body
//! carries. In session mode it is the subject of a verified bearer token and
//! any body identifier is ignored.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use quill_core::ports::{AuthError, SessionClaims};
use quill_shared::ErrorResponse;

use crate::config::AuthMode;
use crate::state::AppState;

/// Verified session identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub email: String,
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject: claims.subject,
            email: claims.email,
        }
    }
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
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your session has expired. Please sign in again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::unauthorized(
                "Please provide a valid Bearer token in the Authorization header.",
            ),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

fn verify_bearer(req: &HttpRequest, state: &AppState) -> Result<Identity, AuthError> {
    let Some(tokens) = &state.tokens else {
        tracing::error!("Session mode without a token service");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let auth_str = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    tokens.verify(token.trim()).map(Identity::from)
}

/// The acting principal of a mutating request.
///
/// ```ignore
/// async fn delete(actor: Actor, body: web::Json<AuthorRequest>) -> AppResult<HttpResponse> {
///     let author_id = actor.resolve(body.author_id.clone());
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub enum Actor {
    /// Client mode: the body identifier is trusted.
    Claimed,
    /// Session mode: the token subject wins.
    Verified(Identity),
}

impl Actor {
    /// Identifier used for ownership checks and as the owner of new records.
    pub fn resolve(&self, claimed: Option<String>) -> Option<String> {
        match self {
            Actor::Claimed => claimed,
            Actor::Verified(identity) => {
                if let Some(claimed) = claimed.as_deref() {
                    if claimed != identity.subject {
                        tracing::debug!(
                            claimed,
                            subject = %identity.subject,
                            "Ignoring body identifier that differs from session subject"
                        );
                    }
                }
                Some(identity.subject.clone())
            }
        }
    }
}

impl FromRequest for Actor {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            ))));
        };

        let result = match state.auth_mode {
            AuthMode::Client => Ok(Actor::Claimed),
            AuthMode::Session => verify_bearer(req, state)
                .map(|identity| {
                    tracing::debug!(subject = %identity.subject, email = %identity.email, "Session verified");
                    Actor::Verified(identity)
                })
                .map_err(|e| {
                    tracing::warn!("Rejected session token: {}", e);
                    AuthenticationError(e)
                }),
        };

        ready(result)
    }
}
