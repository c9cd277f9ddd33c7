use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use security_core::error::AppError;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::authenticators::Authenticator;
use crate::models::{
    AuthResponse, AuthenticationUser, AzureADResponse, AzureADUser, DefaultUser, FacebookUser,
    TokenResponse,
};

pub type DefaultAuth = Arc<dyn Authenticator<DefaultUser>>;
pub type FacebookAuth = Arc<dyn Authenticator<FacebookUser>>;
pub type AzureADAuth = Arc<dyn Authenticator<AzureADUser, AzureADResponse>>;

/// Error body shared by [`AppError`] responses and the bearer layer.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// An unreadable body is a missing credential, which the authenticator
/// turns into a rejection.
fn credential<U>(body: Result<Json<U>, JsonRejection>) -> Option<U> {
    match body {
        Ok(Json(user)) => Some(user),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Unreadable credential body");
            None
        }
    }
}

/// 200 with the token, or 400 with an empty token when the credential was
/// refused. Faults go through [`AppError`].
async fn respond<U, R>(
    authenticator: &dyn Authenticator<U, R>,
    credential: Option<U>,
) -> Result<Response, AppError>
where
    U: AuthenticationUser,
    R: TokenResponse + Serialize,
{
    let response = authenticator.is_valid_user(credential).await?;
    let status = if response.is_authenticated() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(response)).into_response())
}

/// Exchange an id and password for a token
#[utoipa::path(
    post,
    path = "/token",
    request_body = DefaultUser,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 400, description = "Credential rejected", body = AuthResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Token"
)]
pub async fn default_token(
    State(authenticator): State<DefaultAuth>,
    body: Result<Json<DefaultUser>, JsonRejection>,
) -> Result<Response, AppError> {
    respond(authenticator.as_ref(), credential(body)).await
}

/// Token endpoint for a caller-defined user model.
pub async fn custom_token<U>(
    State(authenticator): State<Arc<dyn Authenticator<U>>>,
    body: Result<Json<U>, JsonRejection>,
) -> Result<Response, AppError>
where
    U: AuthenticationUser + DeserializeOwned,
{
    respond(authenticator.as_ref(), credential(body)).await
}

/// Exchange a Facebook user access token for a token
#[utoipa::path(
    post,
    path = "/facebook",
    request_body = FacebookUser,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 400, description = "Facebook token rejected", body = AuthResponse),
        (status = 502, description = "Facebook unreachable", body = ErrorResponse)
    ),
    tag = "Token"
)]
pub async fn facebook_token(
    State(authenticator): State<FacebookAuth>,
    body: Result<Json<FacebookUser>, JsonRejection>,
) -> Result<Response, AppError> {
    respond(authenticator.as_ref(), credential(body)).await
}

/// Obtain an Azure AD token for the configured application
#[utoipa::path(
    post,
    path = "/azure",
    responses(
        (status = 200, description = "Token acquired", body = AzureADResponse),
        (status = 400, description = "Azure AD refused the client credentials", body = AzureADResponse),
        (status = 502, description = "Azure AD unreachable", body = ErrorResponse)
    ),
    tag = "Token"
)]
pub async fn azure_token(State(authenticator): State<AzureADAuth>) -> Result<Response, AppError> {
    respond(authenticator.as_ref(), None).await
}

pub fn default_routes(authenticator: DefaultAuth) -> Router {
    Router::new()
        .route("/token", post(default_token))
        .with_state(authenticator)
}

pub fn custom_routes<U>(authenticator: Arc<dyn Authenticator<U>>) -> Router
where
    U: AuthenticationUser + DeserializeOwned,
{
    Router::new()
        .route("/token", post(custom_token::<U>))
        .with_state(authenticator)
}

pub fn facebook_routes(authenticator: FacebookAuth) -> Router {
    Router::new()
        .route("/facebook", post(facebook_token))
        .with_state(authenticator)
}

pub fn azure_routes(authenticator: AzureADAuth) -> Router {
    Router::new()
        .route("/azure", post(azure_token))
        .with_state(authenticator)
}
