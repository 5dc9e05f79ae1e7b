//! Session identity extractors.
//!
//! The session token is a JWT issued by the identity provider. It is read from
//! the session cookie, or from an `Authorization: Bearer` header for API
//! clients.

use std::future::{Ready, ready};

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use inkwell_core::ports::{AuthError, TokenClaims};
use inkwell_core::services::Actor;

use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn new_post(Identity(actor): Identity) -> impl Responder {
///     format!("Hello, {}!", actor.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub Actor);

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self(Actor::new(claims.user_id, claims.username))
    }
}

/// A request without a valid session. Answered with a redirect to the login
/// page that carries the original path and query in `next`.
#[derive(Debug, thiserror::Error)]
#[error("authentication required: {reason}")]
pub struct LoginRequired {
    reason: AuthError,
    location: String,
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.location.clone()))
            .finish()
    }
}

/// `login_url?next=<path and query>`.
pub fn login_redirect(login_url: &str, next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{login_url}?{query}")
}

fn session_token(req: &HttpRequest, cookie_name: &str) -> Result<String, AuthError> {
    if let Some(cookie) = req.cookie(cookie_name) {
        return Ok(cookie.value().to_string());
    }

    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Err(AuthError::MissingAuth);
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

fn authenticate(req: &HttpRequest) -> Result<Identity, LoginRequired> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(LoginRequired {
            reason: AuthError::InvalidToken("Server configuration error".to_string()),
            location: "/".to_string(),
        });
    };

    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    session_token(req, &state.session.cookie_name)
        .and_then(|token| state.tokens.validate_token(&token))
        .map(Identity::from)
        .map_err(|reason| {
            tracing::debug!(path = %next, reason = %reason, "Redirecting to login");
            LoginRequired {
                reason,
                location: login_redirect(&state.session.login_url, next),
            }
        })
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Actor>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok().map(|id| id.0))))
    }
}
