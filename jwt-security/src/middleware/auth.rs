use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::services::{TokenClaims, TokenVerifier};

type Rejection = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, error: &str) -> Rejection {
    (status, Json(ErrorResponse::new(error)))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Bearer validation layer. Verified claims are stored as a request
/// extension for [`AuthUser`].
pub async fn auth_middleware(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, Rejection> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        reject(
            StatusCode::UNAUTHORIZED,
            "Missing or invalid Authorization header",
        )
    })?;

    let claims = verifier.verify_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        reject(StatusCode::UNAUTHORIZED, "Invalid or expired token")
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Claims of the verified bearer token.
pub struct AuthUser(pub TokenClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                reject(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Auth claims missing from request extensions",
                )
            })
    }
}
